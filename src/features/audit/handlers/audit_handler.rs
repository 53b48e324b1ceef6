use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::core::error::Result;
use crate::features::audit::dtos::{AuditLogFilter, AuditLogResponseDto};
use crate::features::audit::services::AuditService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List audit log entries (admin only)
#[utoipa::path(
    get,
    path = "/audit",
    params(AuditLogFilter, PaginationQuery),
    responses(
        (status = 200, description = "Audit log entries, newest first", body = ApiResponse<Vec<AuditLogResponseDto>>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "audit"
)]
pub async fn list_audit_logs(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AuditService>>,
    Query(filter): Query<AuditLogFilter>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AuditLogResponseDto>>>> {
    let (logs, total) = service.list(&filter, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(logs),
        None,
        Some(Meta { total }),
    )))
}
