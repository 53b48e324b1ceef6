use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::audit::dtos::{AuditLogFilter, AuditLogResponseDto};
use crate::features::audit::models::AuditLogWithUser;
use crate::shared::types::PaginationQuery;

/// Service for the append-only audit trail
pub struct AuditService {
    pool: PgPool,
}

impl AuditService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one audit row for a privileged mutation.
    ///
    /// Best-effort: a failed insert is logged but never fails the
    /// business operation that triggered it.
    pub async fn log(
        &self,
        user_id: Uuid,
        action: &str,
        target_type: Option<&str>,
        target_id: Option<Uuid>,
    ) {
        let result = sqlx::query(
            r#"
            INSERT INTO audit_logs (user_id, action, target_type, target_id)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(action)
        .bind(target_type)
        .bind(target_id)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => tracing::debug!(
                "Audit: user={} action={} target={:?}/{:?}",
                user_id,
                action,
                target_type,
                target_id
            ),
            Err(e) => tracing::error!("Failed to append audit log: {:?}", e),
        }
    }

    /// List audit entries, newest first, with optional filters.
    pub async fn list(
        &self,
        filter: &AuditLogFilter,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<AuditLogResponseDto>, i64)> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM audit_logs
            WHERE ($1::uuid IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR action = $2)
              AND ($3::text IS NULL OR target_type = $3)
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.action.as_deref())
        .bind(filter.target_type.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let logs = sqlx::query_as::<_, AuditLogWithUser>(
            r#"
            SELECT a.id, a.user_id, u.username, a.action, a.target_type, a.target_id, a.timestamp
            FROM audit_logs a
            LEFT JOIN users u ON u.id = a.user_id
            WHERE ($1::uuid IS NULL OR a.user_id = $1)
              AND ($2::text IS NULL OR a.action = $2)
              AND ($3::text IS NULL OR a.target_type = $3)
            ORDER BY a.timestamp DESC
            LIMIT $4 OFFSET $5
            "#,
        )
        .bind(filter.user_id)
        .bind(filter.action.as_deref())
        .bind(filter.target_type.as_deref())
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok((logs.into_iter().map(Into::into).collect(), total))
    }
}
