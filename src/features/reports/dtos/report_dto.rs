use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::reports::models::{ReportStatus, ReportType, ReportWithAddress};

/// Request DTO for creating a draft report. The address is given either
/// by id or as a free-form string that is deduplicated or created.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReportRequestDto {
    pub report_type: ReportType,

    /// Free-form address text; ignored when address_id is given
    pub address: Option<String>,

    pub address_id: Option<Uuid>,

    /// Agent to credit; also auto-assigned to the address when it has
    /// no active agent link yet
    pub agent_id: Option<Uuid>,

    /// Template form payload, validated against the report type's schema
    pub form_data: serde_json::Value,
}

impl CreateReportRequestDto {
    pub fn has_address(&self) -> bool {
        self.address_id.is_some()
            || self
                .address
                .as_deref()
                .is_some_and(|a| !a.trim().is_empty())
    }
}

/// Request DTO for replacing a draft report's form data
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateReportRequestDto {
    pub form_data: serde_json::Value,
}

/// Request DTO for approving a report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApproveReportRequestDto {
    /// Mandatory and positive when the owning agent is a flagged affiliate
    pub reward: Option<Decimal>,
}

/// Request DTO for declining a report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeclineReportRequestDto {
    pub comment: Option<String>,
}

/// Request DTO for a presigned direct image upload
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct PresignUploadRequestDto {
    #[validate(length(min = 1, max = 255, message = "File name must be 1-255 characters"))]
    pub file_name: String,
}

/// Response DTO for a presigned direct image upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PresignUploadResponseDto {
    /// PUT here to upload the file
    pub upload_url: String,
    /// Object key the upload lands under
    pub key: String,
    /// Stable URL of the object once uploaded
    pub public_url: String,
    /// Seconds until the upload URL expires
    pub expires_in: u32,
}

/// Response DTO for an inspection report
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub address_id: Uuid,
    pub address: String,
    pub publisher_id: Uuid,
    pub agent_id: Option<Uuid>,
    pub report_type: ReportType,
    pub status: ReportStatus,
    pub form_data: serde_json::Value,
    pub pdf_url: String,
    pub reward: Option<Decimal>,
    pub comment: Option<String>,
    pub reviewer_id: Option<Uuid>,
    pub created_date: DateTime<Utc>,
    pub review_date: Option<DateTime<Utc>>,
}

impl From<ReportWithAddress> for ReportResponseDto {
    fn from(row: ReportWithAddress) -> Self {
        Self {
            id: row.id,
            address_id: row.address_id,
            address: row.address,
            publisher_id: row.publisher_id,
            agent_id: row.agent_id,
            report_type: row.report_type,
            status: row.status,
            form_data: row.form_data,
            pdf_url: row.pdf_url,
            reward: row.reward,
            comment: row.comment,
            reviewer_id: row.reviewer_id,
            created_date: row.created_date,
            review_date: row.review_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_requires_some_address() {
        let dto: CreateReportRequestDto = serde_json::from_value(json!({
            "report_type": "gas",
            "form_data": {}
        }))
        .unwrap();
        assert!(!dto.has_address());

        let dto: CreateReportRequestDto = serde_json::from_value(json!({
            "report_type": "gas",
            "address": "   ",
            "form_data": {}
        }))
        .unwrap();
        assert!(!dto.has_address());

        let dto: CreateReportRequestDto = serde_json::from_value(json!({
            "report_type": "gas",
            "address": "1 Example St",
            "form_data": {}
        }))
        .unwrap();
        assert!(dto.has_address());
    }
}
