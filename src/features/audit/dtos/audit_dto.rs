use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::features::audit::models::AuditLogWithUser;

/// Query filters for the admin audit listing
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AuditLogFilter {
    /// Filter by acting user
    pub user_id: Option<Uuid>,
    /// Filter by action keyword (e.g. APPROVE)
    pub action: Option<String>,
    /// Filter by target type (e.g. REPORT)
    pub target_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuditLogResponseDto {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: Option<String>,
    pub action: String,
    pub target_type: Option<String>,
    pub target_id: Option<Uuid>,
    pub timestamp: DateTime<Utc>,
}

impl From<AuditLogWithUser> for AuditLogResponseDto {
    fn from(log: AuditLogWithUser) -> Self {
        Self {
            id: log.id,
            user_id: log.user_id,
            username: log.username,
            action: log.action,
            target_type: log.target_type,
            target_id: log.target_id,
            timestamp: log.timestamp,
        }
    }
}
