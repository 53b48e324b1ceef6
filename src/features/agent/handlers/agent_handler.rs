use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::agent::dtos::{
    AddressAgentResponseDto, AddressResponseDto, AddressSearchQuery, AgentRewardResponseDto,
    AgentStatusResponseDto, ApproveWithdrawalRequestDto, AssignAddressRequestDto,
    EditAddressLinkRequestDto, WithdrawRequestDto, WithdrawalFilter, WithdrawalResponseDto,
};
use crate::features::agent::routes::AgentState;
use crate::features::auth::guards::{RequireAdmin, RequireAgent};
use crate::features::auth::model::AuthenticatedUser;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery};

/// Search addresses
#[utoipa::path(
    get,
    path = "/agent/addresses",
    params(AddressSearchQuery),
    responses(
        (status = 200, description = "Up to 10 matching addresses", body = ApiResponse<Vec<AddressResponseDto>>)
    ),
    security(("bearer_auth" = [])),
    tag = "agent"
)]
pub async fn search_addresses(
    _user: AuthenticatedUser,
    State(state): State<AgentState>,
    Query(query): Query<AddressSearchQuery>,
) -> Result<Json<ApiResponse<Vec<AddressResponseDto>>>> {
    let addresses = state
        .assignments
        .search_addresses(query.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::success(Some(addresses), None, None)))
}

/// Assign an agent to an address
#[utoipa::path(
    post,
    path = "/agent/address",
    request_body = AssignAddressRequestDto,
    responses(
        (status = 201, description = "Assignment created", body = ApiResponse<AddressAgentResponseDto>),
        (status = 403, description = "Caller may not assign for this agent"),
        (status = 404, description = "Agent or address not found"),
        (status = 409, description = "Address already has an active assignment")
    ),
    security(("bearer_auth" = [])),
    tag = "agent"
)]
pub async fn assign_address(
    user: AuthenticatedUser,
    State(state): State<AgentState>,
    AppJson(dto): AppJson<AssignAddressRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<AddressAgentResponseDto>>)> {
    let link = state.assignments.assign(&user, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(link), None, None)),
    ))
}

/// Repoint an active assignment at another address
#[utoipa::path(
    put,
    path = "/agent/address/{link_id}",
    params(("link_id" = Uuid, Path, description = "Assignment id")),
    request_body = EditAddressLinkRequestDto,
    responses(
        (status = 200, description = "Assignment updated", body = ApiResponse<AddressAgentResponseDto>),
        (status = 403, description = "Caller may not modify this assignment"),
        (status = 404, description = "Assignment or address not found"),
        (status = 409, description = "Target address already has an active assignment")
    ),
    security(("bearer_auth" = [])),
    tag = "agent"
)]
pub async fn edit_address_link(
    user: AuthenticatedUser,
    State(state): State<AgentState>,
    Path(link_id): Path<Uuid>,
    AppJson(dto): AppJson<EditAddressLinkRequestDto>,
) -> Result<Json<ApiResponse<AddressAgentResponseDto>>> {
    let link = state.assignments.edit(&user, link_id, dto).await?;
    Ok(Json(ApiResponse::success(Some(link), None, None)))
}

/// Deactivate an assignment
#[utoipa::path(
    delete,
    path = "/agent/address/{link_id}",
    params(("link_id" = Uuid, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment deactivated"),
        (status = 403, description = "Caller may not remove this assignment"),
        (status = 404, description = "Assignment not found or already inactive")
    ),
    security(("bearer_auth" = [])),
    tag = "agent"
)]
pub async fn remove_address_link(
    user: AuthenticatedUser,
    State(state): State<AgentState>,
    Path(link_id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    state.assignments.unassign(&user, link_id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Assignment removed".to_string()),
        None,
    )))
}

/// Agent dashboard status
#[utoipa::path(
    get,
    path = "/agent/status",
    responses(
        (status = 200, description = "Affiliate flag, balance, and withdrawal totals", body = ApiResponse<AgentStatusResponseDto>),
        (status = 403, description = "Caller is not an agent")
    ),
    security(("bearer_auth" = [])),
    tag = "agent"
)]
pub async fn agent_status(
    RequireAgent(agent): RequireAgent,
    State(state): State<AgentState>,
) -> Result<Json<ApiResponse<AgentStatusResponseDto>>> {
    let status = state.rewards.status(&agent).await?;
    Ok(Json(ApiResponse::success(Some(status), None, None)))
}

/// Submit a withdrawal request
#[utoipa::path(
    post,
    path = "/agent/withdraw",
    request_body = WithdrawRequestDto,
    responses(
        (status = 201, description = "Withdrawal submitted as pending", body = ApiResponse<WithdrawalResponseDto>),
        (status = 400, description = "Amount not positive or exceeds the balance"),
        (status = 403, description = "Caller is not an agent")
    ),
    security(("bearer_auth" = [])),
    tag = "agent"
)]
pub async fn submit_withdrawal(
    RequireAgent(agent): RequireAgent,
    State(state): State<AgentState>,
    AppJson(dto): AppJson<WithdrawRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<WithdrawalResponseDto>>)> {
    let withdrawal = state.rewards.withdraw(&agent, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(withdrawal), None, None)),
    ))
}

/// List withdrawal requests
#[utoipa::path(
    get,
    path = "/agent/withdrawals",
    params(WithdrawalFilter, PaginationQuery),
    responses(
        (status = 200, description = "Withdrawals newest first; admins see all, agents their own", body = ApiResponse<Vec<WithdrawalResponseDto>>)
    ),
    security(("bearer_auth" = [])),
    tag = "agent"
)]
pub async fn list_withdrawals(
    user: AuthenticatedUser,
    State(state): State<AgentState>,
    Query(filter): Query<WithdrawalFilter>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<WithdrawalResponseDto>>>> {
    let (withdrawals, total) = state
        .rewards
        .list_withdrawals(&user, &filter, &pagination)
        .await?;
    Ok(Json(ApiResponse::success(
        Some(withdrawals),
        None,
        Some(Meta { total }),
    )))
}

/// Approve a pending withdrawal (admin only)
#[utoipa::path(
    post,
    path = "/agent/withdrawals/{id}/approve",
    params(("id" = Uuid, Path, description = "Withdrawal id")),
    request_body = ApproveWithdrawalRequestDto,
    responses(
        (status = 200, description = "Withdrawal approved and balance debited", body = ApiResponse<WithdrawalResponseDto>),
        (status = 400, description = "Missing invoice URL"),
        (status = 404, description = "Withdrawal not found"),
        (status = 409, description = "Already decided or balance no longer covers the amount")
    ),
    security(("bearer_auth" = [])),
    tag = "agent"
)]
pub async fn approve_withdrawal(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AgentState>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<ApproveWithdrawalRequestDto>,
) -> Result<Json<ApiResponse<WithdrawalResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let withdrawal = state.rewards.approve_withdrawal(&admin, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(withdrawal), None, None)))
}

/// Deny a pending withdrawal (admin only)
#[utoipa::path(
    post,
    path = "/agent/withdrawals/{id}/deny",
    params(("id" = Uuid, Path, description = "Withdrawal id")),
    responses(
        (status = 200, description = "Withdrawal denied", body = ApiResponse<WithdrawalResponseDto>),
        (status = 404, description = "Withdrawal not found"),
        (status = 409, description = "Withdrawal was already decided")
    ),
    security(("bearer_auth" = [])),
    tag = "agent"
)]
pub async fn deny_withdrawal(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AgentState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WithdrawalResponseDto>>> {
    let withdrawal = state.rewards.deny_withdrawal(&admin, id).await?;
    Ok(Json(ApiResponse::success(Some(withdrawal), None, None)))
}

/// List agent reward balances (admin only)
#[utoipa::path(
    get,
    path = "/agent/rewards",
    params(WithdrawalFilter, PaginationQuery),
    responses(
        (status = 200, description = "Agent balances", body = ApiResponse<Vec<AgentRewardResponseDto>>),
        (status = 403, description = "Admin access required")
    ),
    security(("bearer_auth" = [])),
    tag = "agent"
)]
pub async fn list_rewards(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AgentState>,
    Query(filter): Query<WithdrawalFilter>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<AgentRewardResponseDto>>>> {
    let (rewards, total) = state.rewards.list_rewards(&filter, &pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(rewards),
        None,
        Some(Meta { total }),
    )))
}
