use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::users::handlers;
use crate::features::users::services::UserService;

/// Routes for the users feature (all require authentication)
pub fn routes(service: Arc<UserService>) -> Router {
    Router::new()
        .route(
            "/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .route(
            "/users/{id}",
            put(handlers::update_user).delete(handlers::delete_user),
        )
        .route("/users/{id}/affiliate", put(handlers::set_affiliate))
        .with_state(service)
}
