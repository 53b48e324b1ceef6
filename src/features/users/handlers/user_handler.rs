use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::dtos::{
    CreateUserRequestDto, SetAffiliateRequestDto, UpdateUserRequestDto, UserResponseDto,
};
use crate::features::users::services::UserService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// List user accounts (admin only)
#[utoipa::path(
    get,
    path = "/users",
    params(PaginationQuery),
    responses(
        (status = 200, description = "User accounts, newest first", body = ApiResponse<Vec<UserResponseDto>>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn list_users(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<UserResponseDto>>>> {
    let (users, total) = service.list(&pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(users),
        None,
        Some(Meta { total }),
    )))
}

/// Create a user account (admin only)
#[utoipa::path(
    post,
    path = "/users",
    request_body = CreateUserRequestDto,
    responses(
        (status = 201, description = "User created", body = ApiResponse<UserResponseDto>),
        (status = 400, description = "Validation error or email/username taken"),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    AppJson(dto): AppJson<CreateUserRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.create(&admin, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(user), None, None)),
    ))
}

/// Update a user account (admin, or self for own profile fields)
#[utoipa::path(
    put,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUserRequestDto,
    responses(
        (status = 200, description = "User updated", body = ApiResponse<UserResponseDto>),
        (status = 403, description = "Not allowed to modify this account"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn update_user(
    actor: AuthenticatedUser,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateUserRequestDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = service.update(&actor, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}

/// Delete a user account (admin only)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn delete_user(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&admin, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("User deleted".to_string()),
        None,
    )))
}

/// Set or unset the affiliate flag on an agent (admin only)
#[utoipa::path(
    put,
    path = "/users/{id}/affiliate",
    params(("id" = Uuid, Path, description = "Agent user id")),
    request_body = SetAffiliateRequestDto,
    responses(
        (status = 200, description = "Affiliate flag updated", body = ApiResponse<UserResponseDto>),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Agent not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn set_affiliate(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<UserService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SetAffiliateRequestDto>,
) -> Result<Json<ApiResponse<UserResponseDto>>> {
    let user = service.set_affiliate(&admin, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(user), None, None)))
}
