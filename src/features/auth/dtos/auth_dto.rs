use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::users::models::{User, UserType};
use crate::shared::validation::{PHONE_REGEX, USERNAME_REGEX};

/// Request DTO for user registration
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequestDto {
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

    /// Account role; defaults to "user" when omitted
    #[serde(default = "default_user_type")]
    pub user_type: UserType,
}

fn default_user_type() -> UserType {
    UserType::User
}

/// Request DTO for user login
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response DTO for token refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshTokenResponseDto {
    /// New JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token expiry time in seconds
    pub expires_in: i64,
}

/// Response DTO for authentication (register/login)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponseDto {
    /// JWT access token
    pub access_token: String,
    /// Token type (always "Bearer")
    pub token_type: String,
    /// Access token expiry time in seconds
    pub expires_in: i64,
    /// Authenticated user info
    pub user: AuthUserDto,
}

/// User info included in auth responses
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthUserDto {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub user_type: UserType,
    pub is_affiliate: bool,
}

impl From<&User> for AuthUserDto {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            user_type: user.user_type,
            is_affiliate: user.is_affiliate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn register_defaults_to_user_role() {
        let dto: RegisterRequestDto = serde_json::from_str(
            r#"{"username":"jane","email":"jane@example.com","password":"longenough"}"#,
        )
        .unwrap();
        assert_eq!(dto.user_type, UserType::User);
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn register_rejects_short_password() {
        let dto: RegisterRequestDto = serde_json::from_str(
            r#"{"username":"jane","email":"jane@example.com","password":"short"}"#,
        )
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn register_rejects_malformed_username_and_phone() {
        let dto: RegisterRequestDto = serde_json::from_str(
            r#"{"username":"user name","email":"jane@example.com","password":"longenough"}"#,
        )
        .unwrap();
        assert!(dto.validate().is_err());

        let dto: RegisterRequestDto = serde_json::from_str(
            r#"{"username":"jane","email":"jane@example.com","password":"longenough","phone":"not-a-phone"}"#,
        )
        .unwrap();
        assert!(dto.validate().is_err());
    }

    #[test]
    fn login_rejects_bad_email() {
        let dto = LoginRequestDto {
            email: "not-an-email".to_string(),
            password: "pw".to_string(),
        };
        assert!(dto.validate().is_err());
    }
}
