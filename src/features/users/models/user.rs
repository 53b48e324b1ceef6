use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// User role enum matching database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "user_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Admin,
    Agent,
    User,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::Admin => write!(f, "admin"),
            UserType::Agent => write!(f, "agent"),
            UserType::User => write!(f, "user"),
        }
    }
}

/// Database model for a user account
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub is_affiliate: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_type_display_matches_db_labels() {
        assert_eq!(UserType::Admin.to_string(), "admin");
        assert_eq!(UserType::Agent.to_string(), "agent");
        assert_eq!(UserType::User.to_string(), "user");
    }

    #[test]
    fn user_type_serde_round_trip() {
        let json = serde_json::to_string(&UserType::Agent).unwrap();
        assert_eq!(json, "\"agent\"");
        let back: UserType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UserType::Agent);
    }
}
