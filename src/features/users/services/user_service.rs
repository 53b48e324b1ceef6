use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::audit::AuditService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::password::hash_password;
use crate::features::users::dtos::{
    CreateUserRequestDto, SetAffiliateRequestDto, UpdateUserRequestDto, UserResponseDto,
};
use crate::features::users::models::{User, UserType};
use crate::shared::constants::{
    ACTION_CREATE, ACTION_DELETE, ACTION_SET_AFFILIATE, ACTION_UPDATE, TARGET_USER,
};
use crate::shared::types::PaginationQuery;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, phone, user_type, is_affiliate, created_at";

/// Account management: admin CRUD plus self-service profile updates.
pub struct UserService {
    pool: PgPool,
    audit: Arc<AuditService>,
}

impl UserService {
    pub fn new(pool: PgPool, audit: Arc<AuditService>) -> Self {
        Self { pool, audit }
    }

    pub async fn list(&self, pagination: &PaginationQuery) -> Result<(Vec<UserResponseDto>, i64)> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
            USER_COLUMNS
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok((users.iter().map(UserResponseDto::from).collect(), total))
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        dto: CreateUserRequestDto,
    ) -> Result<UserResponseDto> {
        self.ensure_identifiers_free(&dto.email, &dto.username, None)
            .await?;

        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash, phone, user_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(&dto.phone)
        .bind(dto.user_type)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.audit
            .log(actor.id, ACTION_CREATE, Some(TARGET_USER), Some(user.id))
            .await;

        Ok(UserResponseDto::from(&user))
    }

    /// Partial update. Admins may edit anyone including the role;
    /// everyone else only their own profile fields.
    pub async fn update(
        &self,
        actor: &AuthenticatedUser,
        user_id: Uuid,
        dto: UpdateUserRequestDto,
    ) -> Result<UserResponseDto> {
        if !actor.can_act_for(user_id) {
            return Err(AppError::Forbidden(
                "Cannot modify another user's account".to_string(),
            ));
        }
        if dto.user_type.is_some() && !actor.is_admin() {
            return Err(AppError::Forbidden(
                "Only administrators can change account roles".to_string(),
            ));
        }

        let current = self.load_user(user_id).await?;

        let username = dto.username.unwrap_or(current.username);
        let email = dto.email.unwrap_or(current.email);
        let phone = dto.phone.or(current.phone);
        let user_type = dto.user_type.unwrap_or(current.user_type);
        let password_hash = match dto.password {
            Some(password) => hash_password(&password)?,
            None => current.password_hash,
        };

        self.ensure_identifiers_free(&email, &username, Some(user_id))
            .await?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET username = $1, email = $2, password_hash = $3, phone = $4, user_type = $5
            WHERE id = $6
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&username)
        .bind(&email)
        .bind(&password_hash)
        .bind(&phone)
        .bind(user_type)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.audit
            .log(actor.id, ACTION_UPDATE, Some(TARGET_USER), Some(user_id))
            .await;

        Ok(UserResponseDto::from(&user))
    }

    pub async fn delete(&self, actor: &AuthenticatedUser, user_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.audit
            .log(actor.id, ACTION_DELETE, Some(TARGET_USER), Some(user_id))
            .await;

        Ok(())
    }

    /// Flip the affiliate flag. Only agents can be affiliates.
    pub async fn set_affiliate(
        &self,
        actor: &AuthenticatedUser,
        user_id: Uuid,
        dto: SetAffiliateRequestDto,
    ) -> Result<UserResponseDto> {
        let current = self.load_user(user_id).await?;
        if current.user_type != UserType::Agent {
            return Err(AppError::NotFound("Agent not found".to_string()));
        }

        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET is_affiliate = $1 WHERE id = $2 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(dto.is_affiliate)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.audit
            .log(
                actor.id,
                ACTION_SET_AFFILIATE,
                Some(TARGET_USER),
                Some(user_id),
            )
            .await;

        Ok(UserResponseDto::from(&user))
    }

    async fn load_user(&self, id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Reject an email/username already held by a different account.
    async fn ensure_identifiers_free(
        &self,
        email: &str,
        username: &str,
        exclude: Option<Uuid>,
    ) -> Result<()> {
        let existing: Option<(bool,)> = sqlx::query_as(
            r#"
            SELECT email = $1 FROM users
            WHERE (email = $1 OR username = $2) AND ($3::uuid IS NULL OR id <> $3)
            LIMIT 1
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(exclude)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if let Some((email_taken,)) = existing {
            let field = if email_taken { "Email" } else { "Username" };
            return Err(AppError::BadRequest(format!(
                "{} already registered",
                field
            )));
        }
        Ok(())
    }
}
