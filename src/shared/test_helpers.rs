#![cfg(test)]

use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::UserType;

use axum::{extract::Request, middleware::Next, response::Response, Router};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::Fake;
use uuid::Uuid;

pub fn create_user_with_type(user_type: UserType) -> AuthenticatedUser {
    AuthenticatedUser {
        id: Uuid::new_v4(),
        username: Username().fake(),
        email: SafeEmail().fake(),
        user_type,
        is_affiliate: user_type == UserType::Agent,
    }
}

pub fn create_admin_user() -> AuthenticatedUser {
    create_user_with_type(UserType::Admin)
}

pub fn create_agent_user() -> AuthenticatedUser {
    create_user_with_type(UserType::Agent)
}

/// Layer a router so every request carries the given user, standing in
/// for the bearer-token middleware in handler tests.
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                let response: Response = next.run(request).await;
                response
            }
        },
    ))
}

pub fn with_admin_auth(router: Router) -> Router {
    with_auth(router, create_admin_user())
}
