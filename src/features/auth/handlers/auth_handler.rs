use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderName, StatusCode},
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::dtos::{
    AuthResponseDto, AuthUserDto, LoginRequestDto, RefreshTokenResponseDto, RegisterRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::services::AuthService;
use crate::shared::types::ApiResponse;

const REFRESH_COOKIE: &str = "refresh_token";

/// Refresh tokens travel in an HTTP-only cookie scoped to the auth routes.
fn refresh_cookie_header(service: &AuthService, refresh_token: &str) -> (HeaderName, String) {
    (
        header::SET_COOKIE,
        format!(
            "{}={}; HttpOnly; Secure; SameSite=Strict; Max-Age={}; Path=/auth",
            REFRESH_COOKIE,
            refresh_token,
            service.refresh_ttl_secs()
        ),
    )
}

fn refresh_token_from_cookies(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("refresh_token="))
        .map(str::to_string)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequestDto,
    responses(
        (status = 201, description = "User registered successfully", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error or email/username taken")
    ),
    tag = "auth"
)]
pub async fn register(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<RegisterRequestDto>,
) -> Result<(
    StatusCode,
    [(HeaderName, String); 1],
    Json<ApiResponse<AuthResponseDto>>,
)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (response, refresh_token) = service.register(dto).await?;
    let cookie = refresh_cookie_header(&service, &refresh_token);

    Ok((
        StatusCode::CREATED,
        [cookie],
        Json(ApiResponse::success(Some(response), None, None)),
    ))
}

/// Login with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Login successful", body = ApiResponse<AuthResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Incorrect email or password")
    ),
    tag = "auth"
)]
pub async fn login(
    State(service): State<Arc<AuthService>>,
    AppJson(dto): AppJson<LoginRequestDto>,
) -> Result<([(HeaderName, String); 1], Json<ApiResponse<AuthResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let (response, refresh_token) = service.login(dto).await?;
    let cookie = refresh_cookie_header(&service, &refresh_token);

    Ok(([cookie], Json(ApiResponse::success(Some(response), None, None))))
}

/// Refresh the access token using the refresh cookie
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Token refreshed successfully", body = ApiResponse<RefreshTokenResponseDto>),
        (status = 401, description = "Missing, invalid, or expired refresh token")
    ),
    tag = "auth"
)]
pub async fn refresh_token(
    State(service): State<Arc<AuthService>>,
    headers: HeaderMap,
) -> Result<Json<ApiResponse<RefreshTokenResponseDto>>> {
    let refresh_token = refresh_token_from_cookies(&headers)
        .ok_or_else(|| AppError::Auth("No refresh token provided".to_string()))?;

    let response = service.refresh(&refresh_token).await?;
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}

/// Get current authenticated user info
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user retrieved successfully", body = ApiResponse<AuthUserDto>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<AuthService>>,
) -> Result<Json<ApiResponse<AuthUserDto>>> {
    let profile = service.get_current_user(&user).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn refresh_cookie_is_parsed_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; refresh_token=abc.def.ghi; lang=en"),
        );
        assert_eq!(
            refresh_token_from_cookies(&headers).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn missing_refresh_cookie_yields_none() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(refresh_token_from_cookies(&headers), None);
        assert_eq!(refresh_token_from_cookies(&HeaderMap::new()), None);
    }
}
