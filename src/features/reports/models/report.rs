use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Inspection template tag matching the `report_type` database enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    ElectricalAndSmoke,
    Gas,
    Smoke,
}

impl std::fmt::Display for ReportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportType::ElectricalAndSmoke => write!(f, "electrical_and_smoke"),
            ReportType::Gas => write!(f, "gas"),
            ReportType::Smoke => write!(f, "smoke"),
        }
    }
}

/// Review lifecycle matching the `report_status` database enum.
/// Transitions only flow draft -> approved and draft -> declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Draft,
    Approved,
    Declined,
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportStatus::Draft => write!(f, "draft"),
            ReportStatus::Approved => write!(f, "approved"),
            ReportStatus::Declined => write!(f, "declined"),
        }
    }
}

/// Database model for an inspection report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub address_id: Uuid,
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

/// Report row joined with its address text, for list/detail responses
#[derive(Debug, Clone, FromRow)]
pub struct ReportWithAddress {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_type_serde_uses_db_labels() {
        let json = serde_json::to_string(&ReportType::ElectricalAndSmoke).unwrap();
        assert_eq!(json, "\"electrical_and_smoke\"");
        let back: ReportType = serde_json::from_str("\"gas\"").unwrap();
        assert_eq!(back, ReportType::Gas);
    }

    #[test]
    fn report_status_display_matches_db_labels() {
        assert_eq!(ReportStatus::Draft.to_string(), "draft");
        assert_eq!(ReportStatus::Approved.to_string(), "approved");
        assert_eq!(ReportStatus::Declined.to_string(), "declined");
    }
}
