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
use crate::features::reports::dtos::{
    ApproveReportRequestDto, CreateReportRequestDto, DeclineReportRequestDto,
    PresignUploadRequestDto, PresignUploadResponseDto, ReportResponseDto, UpdateReportRequestDto,
};
use crate::features::reports::services::ReportService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Create a draft report
#[utoipa::path(
    post,
    path = "/reports",
    request_body = CreateReportRequestDto,
    responses(
        (status = 201, description = "Draft report created with rendered PDF", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Missing address or malformed form data"),
        (status = 404, description = "Address or agent not found"),
        (status = 502, description = "Object storage unavailable")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    user: AuthenticatedUser,
    State(service): State<Arc<ReportService>>,
    AppJson(dto): AppJson<CreateReportRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<ReportResponseDto>>)> {
    let report = service.create(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(report), None, None)),
    ))
}

/// List reports visible to the caller
#[utoipa::path(
    get,
    path = "/reports",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Reports newest first; admins see all, others their own", body = ApiResponse<Vec<ReportResponseDto>>)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_reports(
    user: AuthenticatedUser,
    State(service): State<Arc<ReportService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let (reports, total) = service.list(&user, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(reports),
        None,
        Some(Meta { total }),
    )))
}

/// Get one report
#[utoipa::path(
    get,
    path = "/reports/{id}",
    params(("id" = Uuid, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report detail", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found or not visible to the caller")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report(
    user: AuthenticatedUser,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.get(&user, id).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Update a draft report's form data
#[utoipa::path(
    put,
    path = "/reports/{id}",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = UpdateReportRequestDto,
    responses(
        (status = 200, description = "Report updated and PDF re-rendered", body = ApiResponse<ReportResponseDto>),
        (status = 403, description = "Caller is neither the publisher nor an admin"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report is no longer a draft")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report(
    user: AuthenticatedUser,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateReportRequestDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.update(&user, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Approve a draft report (admin only)
#[utoipa::path(
    post,
    path = "/reports/{id}/approve",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = ApproveReportRequestDto,
    responses(
        (status = 200, description = "Report approved; any reward credited", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Reward missing for an affiliate agent's report"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report was already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn approve_report(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ApproveReportRequestDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.approve(&admin, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Decline a draft report (admin only)
#[utoipa::path(
    post,
    path = "/reports/{id}/decline",
    params(("id" = Uuid, Path, description = "Report id")),
    request_body = DeclineReportRequestDto,
    responses(
        (status = 200, description = "Report declined", body = ApiResponse<ReportResponseDto>),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Report was already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn decline_report(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<DeclineReportRequestDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.decline(&admin, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(report), None, None)))
}

/// Delete a draft or declined report (admin only)
#[utoipa::path(
    delete,
    path = "/reports/{id}",
    params(("id" = Uuid, Path, description = "Report id")),
    responses(
        (status = 200, description = "Report deleted"),
        (status = 404, description = "Report not found"),
        (status = 409, description = "Approved reports cannot be deleted")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn delete_report(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    service.delete(&admin, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Report deleted".to_string()),
        None,
    )))
}

/// Presign a direct image upload
#[utoipa::path(
    post,
    path = "/reports/presign-upload",
    request_body = PresignUploadRequestDto,
    responses(
        (status = 200, description = "Time-limited upload URL", body = ApiResponse<PresignUploadResponseDto>),
        (status = 400, description = "Invalid file name")
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn presign_upload(
    _user: AuthenticatedUser,
    State(service): State<Arc<ReportService>>,
    AppJson(dto): AppJson<PresignUploadRequestDto>,
) -> Result<Json<ApiResponse<PresignUploadResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service.presign_upload(dto).await?;
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}
