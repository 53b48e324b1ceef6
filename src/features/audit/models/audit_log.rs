use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Audit row joined with the acting user's name, for the admin listing.
/// Writes go through `AuditService::log` and never read back the row.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogWithUser {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub action: String,
    pub target_type: Option<String>,
    pub target_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}
