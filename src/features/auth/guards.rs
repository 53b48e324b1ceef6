//! Role-based authorization guards.
//!
//! Each guard extracts the authenticated user from the request
//! extensions (placed there by the auth middleware) and verifies the
//! required role. Self-or-admin checks that depend on row ownership
//! live in the services instead.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for admin-only operations (user CRUD, report review,
/// withdrawal decisions, audit access).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Guard for agent-only operations (withdrawal requests, status queries).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAgent(user): RequireAgent) { ... }
/// ```
pub struct RequireAgent(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAgent
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_agent() {
            return Err(AppError::Forbidden("User is not an agent".to_string()));
        }

        Ok(RequireAgent(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use axum_test::TestServer;

    use crate::shared::test_helpers::{create_admin_user, create_agent_user, with_auth};

    async fn admin_only(RequireAdmin(user): RequireAdmin) -> String {
        user.username
    }

    async fn agent_only(RequireAgent(user): RequireAgent) -> String {
        user.username
    }

    fn guarded_router() -> Router {
        Router::new()
            .route("/admin", get(admin_only))
            .route("/agent", get(agent_only))
    }

    #[tokio::test]
    async fn admin_guard_admits_admins_only() {
        let admin = create_admin_user();
        let server = TestServer::new(with_auth(guarded_router(), admin.clone())).unwrap();
        let response = server.get("/admin").await;
        response.assert_status(StatusCode::OK);
        response.assert_text(&admin.username);

        let server = TestServer::new(with_auth(guarded_router(), create_agent_user())).unwrap();
        let response = server.get("/admin").await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn agent_guard_admits_agents_only() {
        let server = TestServer::new(with_auth(guarded_router(), create_agent_user())).unwrap();
        server.get("/agent").await.assert_status(StatusCode::OK);

        let server = TestServer::new(with_auth(guarded_router(), create_admin_user())).unwrap();
        server
            .get("/agent")
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn guards_reject_unauthenticated_requests() {
        let server = TestServer::new(guarded_router()).unwrap();
        server
            .get("/admin")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .get("/agent")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
