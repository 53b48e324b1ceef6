use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::Claims;
use crate::features::users::models::User;

pub const TOKEN_TYPE_ACCESS: &str = "access";
pub const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Issues and validates the service's own HS256 tokens.
///
/// Access tokens are short-lived bearer tokens; refresh tokens are
/// longer-lived and only accepted by the refresh endpoint.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl_secs: config.access_token_ttl.as_secs() as i64,
            refresh_ttl_secs: config.refresh_token_ttl.as_secs() as i64,
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    pub fn issue_access_token(&self, user: &User) -> Result<String> {
        self.issue(user, TOKEN_TYPE_ACCESS, self.access_ttl_secs)
    }

    pub fn issue_refresh_token(&self, user: &User) -> Result<String> {
        self.issue(user, TOKEN_TYPE_REFRESH, self.refresh_ttl_secs)
    }

    fn issue(&self, user: &User, token_type: &str, ttl_secs: i64) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            user_type: user.user_type,
            token_type: token_type.to_string(),
            iat: now,
            exp: now + ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    /// Decode and validate a token of the expected type. Malformed,
    /// expired, or wrong-type tokens all map to an authentication error.
    pub fn decode_token(&self, token: &str, expected_type: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        let data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| AppError::Auth(format!("Invalid token: {}", e)))?;

        if data.claims.token_type != expected_type {
            return Err(AppError::Auth(format!(
                "Expected {} token, got {} token",
                expected_type, data.claims.token_type
            )));
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::users::models::UserType;
    use std::time::Duration;
    use uuid::Uuid;

    fn test_service() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "test-secret-do-not-use".to_string(),
            access_token_ttl: Duration::from_secs(3600),
            refresh_token_ttl: Duration::from_secs(86400),
        })
    }

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "agent1".to_string(),
            email: "agent1@example.com".to_string(),
            password_hash: "x".to_string(),
            phone: None,
            user_type: UserType::Agent,
            is_affiliate: true,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn access_token_round_trip() {
        let service = test_service();
        let user = test_user();

        let token = service.issue_access_token(&user).unwrap();
        let claims = service.decode_token(&token, TOKEN_TYPE_ACCESS).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.user_type, UserType::Agent);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_rejected_as_access() {
        let service = test_service();
        let user = test_user();

        let refresh = service.issue_refresh_token(&user).unwrap();
        let err = service.decode_token(&refresh, TOKEN_TYPE_ACCESS);
        assert!(err.is_err());
    }

    #[test]
    fn garbage_token_rejected() {
        let service = test_service();
        assert!(service
            .decode_token("not-a-jwt", TOKEN_TYPE_ACCESS)
            .is_err());
    }

    #[test]
    fn token_signed_with_other_secret_rejected() {
        let service = test_service();
        let other = TokenService::new(&AuthConfig {
            jwt_secret: "another-secret".to_string(),
            access_token_ttl: Duration::from_secs(3600),
            refresh_token_ttl: Duration::from_secs(86400),
        });

        let token = other.issue_access_token(&test_user()).unwrap();
        assert!(service.decode_token(&token, TOKEN_TYPE_ACCESS).is_err());
    }
}
