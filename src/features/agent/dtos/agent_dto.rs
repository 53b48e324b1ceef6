use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::agent::models::{
    Address, AddressAgentWithDetails, BalanceWithAgent, WithdrawStatus, WithdrawWithAgent,
};

/// Query parameters for address search
#[derive(Debug, Deserialize, IntoParams)]
pub struct AddressSearchQuery {
    /// Case-insensitive substring to match
    pub search: Option<String>,
}

/// Response DTO for an address
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressResponseDto {
    pub id: Uuid,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Address> for AddressResponseDto {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id,
            address: address.address.clone(),
            created_at: address.created_at,
        }
    }
}

/// Request DTO for assigning an agent to an address. The address is
/// given either by id or as a free-form string.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignAddressRequestDto {
    pub agent_id: Uuid,
    pub address: Option<String>,
    pub address_id: Option<Uuid>,
}

impl AssignAddressRequestDto {
    pub fn has_address(&self) -> bool {
        self.address_id.is_some()
            || self
                .address
                .as_deref()
                .is_some_and(|a| !a.trim().is_empty())
    }
}

/// Request DTO for repointing an active assignment at another address
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EditAddressLinkRequestDto {
    pub address_id: Uuid,
}

/// Response DTO for an agent-to-address assignment
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressAgentResponseDto {
    pub id: Uuid,
    pub address_id: Uuid,
    pub address: String,
    pub agent_id: Uuid,
    pub agent_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

impl From<AddressAgentWithDetails> for AddressAgentResponseDto {
    fn from(row: AddressAgentWithDetails) -> Self {
        Self {
            id: row.id,
            address_id: row.address_id,
            address: row.address,
            agent_id: row.agent_id,
            agent_name: row.agent_name,
            active: row.active,
            created_at: row.created_at,
            deactivated_at: row.deactivated_at,
        }
    }
}

/// Response DTO for the agent dashboard status
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgentStatusResponseDto {
    pub is_affiliate: bool,
    pub balance: Decimal,
    pub total_approved_withdrawals: Decimal,
    pub total_pending_withdrawals: Decimal,
}

/// Request DTO for submitting a withdrawal
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WithdrawRequestDto {
    pub amount: Decimal,
}

/// Query filter for the withdrawal list (admin only)
#[derive(Debug, Deserialize, IntoParams)]
pub struct WithdrawalFilter {
    /// Case-insensitive substring match on the agent's username
    pub agent_name: Option<String>,
}

/// Request DTO for approving a withdrawal; the invoice URL is mandatory
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApproveWithdrawalRequestDto {
    #[validate(length(min = 1, message = "Invoice URL is required"))]
    pub invoice_pdf: String,
}

/// Response DTO for a withdrawal request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WithdrawalResponseDto {
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

impl From<WithdrawWithAgent> for WithdrawalResponseDto {
    fn from(row: WithdrawWithAgent) -> Self {
        Self {
            id: row.id,
            agent_id: row.agent_id,
            agent_name: row.agent_name,
            amount: row.amount,
            status: row.status,
            submit_datetime: row.submit_datetime,
            review_datetime: row.review_datetime,
            reviewer_id: row.reviewer_id,
            invoice_pdf: row.invoice_pdf,
        }
    }
}

/// Response DTO for an agent's balance in the admin rewards view
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AgentRewardResponseDto {
    pub id: Uuid,
    pub agent_id: Uuid,
    pub agent_name: String,
    pub is_affiliate: bool,
    pub balance: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl From<BalanceWithAgent> for AgentRewardResponseDto {
    fn from(row: BalanceWithAgent) -> Self {
        Self {
            id: row.id,
            agent_id: row.agent_id,
            agent_name: row.agent_name,
            is_affiliate: row.is_affiliate,
            balance: row.balance,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assign_requires_some_address() {
        let dto: AssignAddressRequestDto = serde_json::from_value(json!({
            "agent_id": Uuid::new_v4()
        }))
        .unwrap();
        assert!(!dto.has_address());

        let dto: AssignAddressRequestDto = serde_json::from_value(json!({
            "agent_id": Uuid::new_v4(),
            "address": "7 Bourke St"
        }))
        .unwrap();
        assert!(dto.has_address());
    }

    #[test]
    fn approve_withdrawal_requires_invoice() {
        let dto = ApproveWithdrawalRequestDto {
            invoice_pdf: String::new(),
        };
        assert!(dto.validate().is_err());
    }
}
