use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::audit::handlers;
use crate::features::audit::services::AuditService;

/// Routes for the audit feature (admin only, requires authentication)
pub fn routes(service: Arc<AuditService>) -> Router {
    Router::new()
        .route("/audit", get(handlers::list_audit_logs))
        .with_state(service)
}
