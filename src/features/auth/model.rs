use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::UserType;

/// Snapshot of the caller's user row, loaded by the auth middleware on
/// every protected request and stashed in the request extensions.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub user_type: UserType,
    pub is_affiliate: bool,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.user_type == UserType::Admin
    }

    pub fn is_agent(&self) -> bool {
        self.user_type == UserType::Agent
    }

    /// Admins may act on anyone; everyone else only on themselves.
    pub fn can_act_for(&self, target_user_id: Uuid) -> bool {
        self.is_admin() || self.id == target_user_id
    }
}

/// JWT claims carried by both access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub user_type: UserType,
    /// "access" or "refresh"
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(user_type: UserType) -> AuthenticatedUser {
        AuthenticatedUser {
            id: Uuid::new_v4(),
            username: "tester".to_string(),
            email: "tester@example.com".to_string(),
            user_type,
            is_affiliate: false,
        }
    }

    #[test]
    fn admin_can_act_for_anyone() {
        let admin = user(UserType::Admin);
        assert!(admin.can_act_for(Uuid::new_v4()));
    }

    #[test]
    fn agent_can_only_act_for_self() {
        let agent = user(UserType::Agent);
        assert!(agent.can_act_for(agent.id));
        assert!(!agent.can_act_for(Uuid::new_v4()));
    }
}
