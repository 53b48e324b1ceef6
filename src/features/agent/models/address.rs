use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for a property address. Rows are deduplicated by
/// exact string match and never deleted.
#[derive(Debug, Clone, FromRow)]
pub struct Address {
    pub id: Uuid,
    pub address: String,
    pub created_at: DateTime<Utc>,
}

/// Database model for an agent-to-address assignment. Unassignment
/// flips `active` off and stamps `deactivated_at`; rows are history.
#[derive(Debug, Clone, FromRow)]
pub struct AddressAgent {
    pub id: Uuid,
    pub address_id: Uuid,
    pub agent_id: Uuid,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}

/// Assignment row joined with the address text and agent username
#[derive(Debug, Clone, FromRow)]
pub struct AddressAgentWithDetails {
    pub id: Uuid,
    pub address_id: Uuid,
    pub address: String,
    pub agent_id: Uuid,
    pub agent_name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub deactivated_at: Option<DateTime<Utc>>,
}
