use std::sync::Arc;

use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::audit::AuditService;
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, RefreshTokenResponseDto, RegisterRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::password::{hash_password, verify_password};
use crate::features::auth::services::token_service::{
    TokenService, TOKEN_TYPE_ACCESS, TOKEN_TYPE_REFRESH,
};
use crate::features::users::models::User;
use crate::shared::constants::{ACTION_LOGIN, ACTION_REGISTER, TARGET_USER};

/// Credential exchange and bearer-token resolution.
pub struct AuthService {
    pool: PgPool,
    tokens: Arc<TokenService>,
    audit: Arc<AuditService>,
}

impl AuthService {
    pub fn new(pool: PgPool, tokens: Arc<TokenService>, audit: Arc<AuditService>) -> Self {
        Self {
            pool,
            tokens,
            audit,
        }
    }

    /// Register a new account and issue an access + refresh token pair.
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<(AuthResponseDto, String)> {
        let existing: Option<(bool,)> = sqlx::query_as(
            "SELECT email = $1 FROM users WHERE email = $1 OR username = $2 LIMIT 1",
        )
        .bind(&dto.email)
        .bind(&dto.username)
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

        let password_hash = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, phone, user_type)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, phone, user_type, is_affiliate, created_at
            "#,
        )
        .bind(&dto.username)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(&dto.phone)
        .bind(dto.user_type)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        tracing::info!("User registered: id={}, username={}", user.id, user.username);

        self.audit
            .log(user.id, ACTION_REGISTER, Some(TARGET_USER), Some(user.id))
            .await;

        self.issue_pair(&user)
    }

    /// Exchange credentials for an access + refresh token pair.
    pub async fn login(&self, dto: LoginRequestDto) -> Result<(AuthResponseDto, String)> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, phone, user_type, is_affiliate, created_at
            FROM users WHERE email = $1
            "#,
        )
        .bind(&dto.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        // Same error for unknown email and wrong password
        let user = user
            .ok_or_else(|| AppError::Auth("Incorrect email or password".to_string()))?;

        if !verify_password(&dto.password, &user.password_hash)? {
            return Err(AppError::Auth("Incorrect email or password".to_string()));
        }

        self.audit
            .log(user.id, ACTION_LOGIN, Some(TARGET_USER), Some(user.id))
            .await;

        self.issue_pair(&user)
    }

    /// Re-issue an access token from a valid refresh token. The password
    /// is not re-checked, but the subject must still exist.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshTokenResponseDto> {
        let claims = self.tokens.decode_token(refresh_token, TOKEN_TYPE_REFRESH)?;

        let user = self.load_user(claims.sub).await?;
        let access_token = self.tokens.issue_access_token(&user)?;

        Ok(RefreshTokenResponseDto {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.access_ttl_secs(),
        })
    }

    /// Resolve a bearer access token to the caller's user row.
    /// Used by the auth middleware on every protected request.
    pub async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser> {
        let claims = self.tokens.decode_token(token, TOKEN_TYPE_ACCESS)?;
        let user = self.load_user(claims.sub).await?;

        Ok(AuthenticatedUser {
            id: user.id,
            username: user.username,
            email: user.email,
            user_type: user.user_type,
            is_affiliate: user.is_affiliate,
        })
    }

    /// Full profile for GET /auth/me.
    pub async fn get_current_user(&self, user: &AuthenticatedUser) -> Result<AuthUserDto> {
        let user = self.load_user(user.id).await?;
        Ok(AuthUserDto::from(&user))
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.tokens.refresh_ttl_secs()
    }

    async fn load_user(&self, id: uuid::Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, phone, user_type, is_affiliate, created_at
            FROM users WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::Auth("Could not validate credentials".to_string()))
    }

    fn issue_pair(&self, user: &User) -> Result<(AuthResponseDto, String)> {
        let access_token = self.tokens.issue_access_token(user)?;
        let refresh_token = self.tokens.issue_refresh_token(user)?;

        Ok((
            AuthResponseDto {
                access_token,
                token_type: "Bearer".to_string(),
                expires_in: self.tokens.access_ttl_secs(),
                user: AuthUserDto::from(user),
            },
            refresh_token,
        ))
    }
}
