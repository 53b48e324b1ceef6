use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{User, UserType};
use crate::shared::validation::{PHONE_REGEX, USERNAME_REGEX};

/// Request DTO for admin user creation
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequestDto {
    #[validate(
        length(min = 1, max = 50, message = "Username must be 1-50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username must start with a letter or underscore and contain only letters, digits, and underscores"
        )
    )]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,

    pub user_type: UserType,
}

/// Request DTO for partial user update. Absent fields keep their value.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequestDto {
    #[validate(
        length(min = 1, max = 50, message = "Username must be 1-50 characters"),
        regex(
            path = *USERNAME_REGEX,
            message = "Username must start with a letter or underscore and contain only letters, digits, and underscores"
        )
    )]
    pub username: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: Option<String>,

    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub phone: Option<String>,

    /// Role change, admin only
    pub user_type: Option<UserType>,
}

/// Request DTO for toggling the affiliate flag on an agent
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SetAffiliateRequestDto {
    pub is_affiliate: bool,
}

/// Response DTO for a user account (never exposes the password hash)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub is_affiliate: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponseDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            user_type: user.user_type,
            is_affiliate: user.is_affiliate,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn update_with_no_fields_is_valid() {
        let dto: UpdateUserRequestDto = serde_json::from_str("{}").unwrap();
        assert!(dto.validate().is_ok());
        assert!(dto.username.is_none());
        assert!(dto.user_type.is_none());
    }

    #[test]
    fn update_rejects_short_password() {
        let dto: UpdateUserRequestDto =
            serde_json::from_str(r#"{"password":"short"}"#).unwrap();
        assert!(dto.validate().is_err());
    }
}
