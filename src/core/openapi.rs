use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::agent::{dtos as agent_dtos, handlers as agent_handlers};
use crate::features::audit::{dtos as audit_dtos, handlers as audit_handlers};
use crate::features::auth;
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::users::{
    dtos as users_dtos, handlers as users_handlers, models as users_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::refresh_token,
        auth::handlers::get_me,
        // Users
        users_handlers::list_users,
        users_handlers::create_user,
        users_handlers::update_user,
        users_handlers::delete_user,
        users_handlers::set_affiliate,
        // Reports
        reports_handlers::create_report,
        reports_handlers::list_reports,
        reports_handlers::get_report,
        reports_handlers::update_report,
        reports_handlers::approve_report,
        reports_handlers::decline_report,
        reports_handlers::delete_report,
        reports_handlers::presign_upload,
        // Agent
        agent_handlers::search_addresses,
        agent_handlers::assign_address,
        agent_handlers::edit_address_link,
        agent_handlers::remove_address_link,
        agent_handlers::agent_status,
        agent_handlers::submit_withdrawal,
        agent_handlers::list_withdrawals,
        agent_handlers::approve_withdrawal,
        agent_handlers::deny_withdrawal,
        agent_handlers::list_rewards,
        // Audit
        audit_handlers::list_audit_logs,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            users_models::UserType,
            auth::model::AuthenticatedUser,
            auth::dtos::RegisterRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::RefreshTokenResponseDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::AuthUserDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            ApiResponse<auth::dtos::RefreshTokenResponseDto>,
            ApiResponse<auth::dtos::AuthUserDto>,
            // Users
            users_dtos::CreateUserRequestDto,
            users_dtos::UpdateUserRequestDto,
            users_dtos::SetAffiliateRequestDto,
            users_dtos::UserResponseDto,
            ApiResponse<Vec<users_dtos::UserResponseDto>>,
            ApiResponse<users_dtos::UserResponseDto>,
            // Reports
            reports_models::ReportType,
            reports_models::ReportStatus,
            reports_dtos::CreateReportRequestDto,
            reports_dtos::UpdateReportRequestDto,
            reports_dtos::ApproveReportRequestDto,
            reports_dtos::DeclineReportRequestDto,
            reports_dtos::PresignUploadRequestDto,
            reports_dtos::PresignUploadResponseDto,
            reports_dtos::ReportResponseDto,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<reports_dtos::PresignUploadResponseDto>,
            // Agent
            agent_dtos::AddressResponseDto,
            agent_dtos::AssignAddressRequestDto,
            agent_dtos::EditAddressLinkRequestDto,
            agent_dtos::AddressAgentResponseDto,
            agent_dtos::AgentStatusResponseDto,
            agent_dtos::WithdrawRequestDto,
            agent_dtos::ApproveWithdrawalRequestDto,
            agent_dtos::WithdrawalResponseDto,
            agent_dtos::AgentRewardResponseDto,
            ApiResponse<Vec<agent_dtos::AddressResponseDto>>,
            ApiResponse<agent_dtos::AddressAgentResponseDto>,
            ApiResponse<agent_dtos::AgentStatusResponseDto>,
            ApiResponse<agent_dtos::WithdrawalResponseDto>,
            ApiResponse<Vec<agent_dtos::WithdrawalResponseDto>>,
            ApiResponse<Vec<agent_dtos::AgentRewardResponseDto>>,
            // Audit
            audit_dtos::AuditLogResponseDto,
            ApiResponse<Vec<audit_dtos::AuditLogResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User account management (admin)"),
        (name = "reports", description = "Safety inspection reports and review"),
        (name = "agent", description = "Address assignment, rewards, and withdrawals"),
        (name = "audit", description = "Audit log (admin only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "CheckHero API",
        version = "0.1.0",
        description = "API documentation for CheckHero",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
