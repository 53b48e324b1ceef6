use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

/// Withdrawal lifecycle matching the `withdraw_status` database enum.
/// Pending requests are decided at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "withdraw_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WithdrawStatus {
    Pending,
    Approved,
    Denied,
}

impl std::fmt::Display for WithdrawStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawStatus::Pending => write!(f, "pending"),
            WithdrawStatus::Approved => write!(f, "approved"),
            WithdrawStatus::Denied => write!(f, "denied"),
        }
    }
}

/// Database model for a withdrawal request
#[derive(Debug, Clone, FromRow)]
pub struct WithdrawReward {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub amount: Decimal,
    pub status: WithdrawStatus,
    pub submit_datetime: DateTime<Utc>,
    pub review_datetime: Option<DateTime<Utc>>,
    pub reviewer_id: Option<Uuid>,
    pub invoice_pdf: Option<String>,
}

/// Withdrawal row joined with the requesting agent's username
#[derive(Debug, Clone, FromRow)]
pub struct WithdrawWithAgent {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub agent_name: String,
    pub amount: Decimal,
    pub status: WithdrawStatus,
    pub submit_datetime: DateTime<Utc>,
    pub review_datetime: Option<DateTime<Utc>>,
    pub reviewer_id: Option<Uuid>,
    pub invoice_pdf: Option<String>,
}

/// Balance row joined with the agent's username, for the admin rewards view
#[derive(Debug, Clone, FromRow)]
pub struct BalanceWithAgent {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub agent_name: String,
    pub is_affiliate: bool,
    pub balance: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn withdraw_status_serde_uses_db_labels() {
        assert_eq!(
            serde_json::to_string(&WithdrawStatus::Pending).unwrap(),
            "\"pending\""
        );
        let back: WithdrawStatus = serde_json::from_str("\"denied\"").unwrap();
        assert_eq!(back, WithdrawStatus::Denied);
    }
}
