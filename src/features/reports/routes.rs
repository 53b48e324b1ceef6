use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::reports::handlers;
use crate::features::reports::services::ReportService;

/// Routes for the reports feature (all require authentication)
pub fn routes(service: Arc<ReportService>) -> Router {
    Router::new()
        .route(
            "/reports",
            get(handlers::list_reports).post(handlers::create_report),
        )
        .route("/reports/presign-upload", post(handlers::presign_upload))
        .route(
            "/reports/{id}",
            get(handlers::get_report)
                .put(handlers::update_report)
                .delete(handlers::delete_report),
        )
        .route("/reports/{id}/approve", post(handlers::approve_report))
        .route("/reports/{id}/decline", post(handlers::decline_report))
        .with_state(service)
}
