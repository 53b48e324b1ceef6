use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::agent::dtos::{
    AddressAgentResponseDto, AddressResponseDto, AssignAddressRequestDto,
    EditAddressLinkRequestDto,
};
use crate::features::agent::models::{Address, AddressAgent, AddressAgentWithDetails};
use crate::features::audit::AuditService;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::users::models::UserType;
use crate::shared::constants::{
    ACTION_ASSIGN_ADDRESS, ACTION_EDIT_ADDRESS, ACTION_REMOVE_ADDRESS, TARGET_ADDRESS_AGENT,
};

const ADDRESS_SEARCH_LIMIT: i64 = 10;

const LINK_JOIN_COLUMNS: &str = "aa.id, aa.address_id, a.address, aa.agent_id, \
     u.username AS agent_name, aa.active, aa.created_at, aa.deactivated_at";

/// Agent-to-address assignment. Each address carries at most one active
/// link; unassignment deactivates rather than deletes so the history of
/// who serviced an address survives.
pub struct AssignmentService {
    pool: PgPool,
    audit: Arc<AuditService>,
}

impl AssignmentService {
    pub fn new(pool: PgPool, audit: Arc<AuditService>) -> Self {
        Self { pool, audit }
    }

    /// Substring address search for assignment pickers.
    pub async fn search_addresses(&self, search: Option<&str>) -> Result<Vec<AddressResponseDto>> {
        let addresses = sqlx::query_as::<_, Address>(
            r#"
            SELECT id, address, created_at FROM addresses
            WHERE $1::text IS NULL OR address ILIKE '%' || $1 || '%'
            ORDER BY address
            LIMIT $2
            "#,
        )
        .bind(search)
        .bind(ADDRESS_SEARCH_LIMIT)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(addresses.iter().map(AddressResponseDto::from).collect())
    }

    /// Assign an agent to an address, creating the address if it was
    /// given as a string. An existing active link wins: the same agent
    /// gets a duplicate conflict, a different agent a conflict naming
    /// the current holder.
    pub async fn assign(
        &self,
        actor: &AuthenticatedUser,
        dto: AssignAddressRequestDto,
    ) -> Result<AddressAgentResponseDto> {
        if !actor.can_act_for(dto.agent_id) {
            return Err(AppError::Forbidden(
                "Cannot assign addresses for another agent".to_string(),
            ));
        }
        if !dto.has_address() {
            return Err(AppError::Validation(
                "Either address or address_id is required".to_string(),
            ));
        }

        self.ensure_agent_exists(dto.agent_id).await?;

        let address = match dto.address_id {
            Some(id) => self.load_address(id).await?,
            None => {
                let text = dto.address.as_deref().unwrap_or_default().trim().to_string();
                self.resolve_or_create_address(&text).await?
            }
        };

        self.ensure_address_unclaimed(address.id, dto.agent_id)
            .await?;

        // A racing assign can slip past the unclaimed check; the partial
        // unique index then rejects the insert, which must still surface
        // as a conflict rather than a server error.
        let link = sqlx::query_as::<_, AddressAgent>(
            r#"
            INSERT INTO address_agents (address_id, agent_id)
            VALUES ($1, $2)
            RETURNING id, address_id, agent_id, active, created_at, deactivated_at
            "#,
        )
        .bind(address.id)
        .bind(dto.agent_id)
        .fetch_one(&self.pool)
        .await
        .map_err(assign_insert_error)?;

        tracing::info!(
            "Address assigned: link={}, address={}, agent={}",
            link.id,
            address.id,
            dto.agent_id
        );

        self.audit
            .log(
                actor.id,
                ACTION_ASSIGN_ADDRESS,
                Some(TARGET_ADDRESS_AGENT),
                Some(link.id),
            )
            .await;

        self.get_link(link.id).await
    }

    /// Repoint an active link at another existing address.
    pub async fn edit(
        &self,
        actor: &AuthenticatedUser,
        link_id: Uuid,
        dto: EditAddressLinkRequestDto,
    ) -> Result<AddressAgentResponseDto> {
        let link = self.load_active_link(link_id).await?;

        if !actor.can_act_for(link.agent_id) {
            return Err(AppError::Forbidden(
                "Cannot modify another agent's assignment".to_string(),
            ));
        }

        let address = self.load_address(dto.address_id).await?;
        if address.id != link.address_id {
            self.ensure_address_unclaimed(address.id, link.agent_id)
                .await?;
        }

        sqlx::query("UPDATE address_agents SET address_id = $1 WHERE id = $2")
            .bind(address.id)
            .bind(link_id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        self.audit
            .log(
                actor.id,
                ACTION_EDIT_ADDRESS,
                Some(TARGET_ADDRESS_AGENT),
                Some(link_id),
            )
            .await;

        self.get_link(link_id).await
    }

    /// Deactivate a link. An already-inactive link is reported as
    /// missing, so a second unassign gets 404.
    pub async fn unassign(&self, actor: &AuthenticatedUser, link_id: Uuid) -> Result<()> {
        let link = self.load_active_link(link_id).await?;

        if !actor.can_act_for(link.agent_id) {
            return Err(AppError::Forbidden(
                "Cannot remove another agent's assignment".to_string(),
            ));
        }

        sqlx::query(
            "UPDATE address_agents SET active = FALSE, deactivated_at = NOW() WHERE id = $1",
        )
        .bind(link_id)
        .execute(&self.pool)
        .await
        .map_err(AppError::Database)?;

        self.audit
            .log(
                actor.id,
                ACTION_REMOVE_ADDRESS,
                Some(TARGET_ADDRESS_AGENT),
                Some(link_id),
            )
            .await;

        Ok(())
    }

    async fn ensure_agent_exists(&self, agent_id: Uuid) -> Result<()> {
        let exists: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE id = $1 AND user_type = $2")
                .bind(agent_id)
                .bind(UserType::Agent)
                .fetch_optional(&self.pool)
                .await
                .map_err(AppError::Database)?;

        exists
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Agent not found".to_string()))
    }

    /// Reject the assignment when the address already has an active
    /// link. The conflict names the holding agent so the caller can
    /// resolve the clash.
    async fn ensure_address_unclaimed(&self, address_id: Uuid, agent_id: Uuid) -> Result<()> {
        let holder: Option<(Uuid, String)> = sqlx::query_as(
            r#"
            SELECT aa.agent_id, u.username
            FROM address_agents aa
            JOIN users u ON u.id = aa.agent_id
            WHERE aa.address_id = $1 AND aa.active
            "#,
        )
        .bind(address_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        match holder {
            Some((holder_id, username)) => Err(claim_conflict(holder_id, &username, agent_id)),
            None => Ok(()),
        }
    }

    async fn load_address(&self, id: Uuid) -> Result<Address> {
        sqlx::query_as::<_, Address>("SELECT id, address, created_at FROM addresses WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound("Address not found".to_string()))
    }

    async fn resolve_or_create_address(&self, text: &str) -> Result<Address> {
        sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses (address) VALUES ($1)
            ON CONFLICT (address) DO UPDATE SET address = EXCLUDED.address
            RETURNING id, address, created_at
            "#,
        )
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn load_active_link(&self, id: Uuid) -> Result<AddressAgent> {
        sqlx::query_as::<_, AddressAgent>(
            r#"
            SELECT id, address_id, agent_id, active, created_at, deactivated_at
            FROM address_agents WHERE id = $1 AND active
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))
    }

    async fn get_link(&self, id: Uuid) -> Result<AddressAgentResponseDto> {
        sqlx::query_as::<_, AddressAgentWithDetails>(&format!(
            r#"
            SELECT {}
            FROM address_agents aa
            JOIN addresses a ON a.id = aa.address_id
            JOIN users u ON u.id = aa.agent_id
            WHERE aa.id = $1
            "#,
            LINK_JOIN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .map(AddressAgentResponseDto::from)
        .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))
    }
}

/// Conflict for an address that already carries an active link. Names
/// the holding agent unless it is the requester themselves.
fn claim_conflict(holder_id: Uuid, holder_username: &str, agent_id: Uuid) -> AppError {
    if holder_id == agent_id {
        AppError::Conflict("Agent is already assigned to this address".to_string())
    } else {
        AppError::Conflict(format!(
            "Address is already assigned to agent '{}' ({})",
            holder_username, holder_id
        ))
    }
}

/// A unique violation on the one-active-link-per-address index means a
/// concurrent assign won the race.
fn assign_insert_error(e: sqlx::Error) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => AppError::Conflict(
            "Address is already assigned to another agent".to_string(),
        ),
        _ => AppError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeUniqueViolation;

    impl std::fmt::Display for FakeUniqueViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "duplicate key value violates unique constraint")
        }
    }

    impl std::error::Error for FakeUniqueViolation {}

    impl sqlx::error::DatabaseError for FakeUniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn duplicate_assignment_by_same_agent_conflicts() {
        let agent = Uuid::new_v4();
        match claim_conflict(agent, "amir", agent) {
            AppError::Conflict(msg) => {
                assert_eq!(msg, "Agent is already assigned to this address")
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn claimed_address_conflict_names_the_holder() {
        let holder = Uuid::new_v4();
        match claim_conflict(holder, "siti", Uuid::new_v4()) {
            AppError::Conflict(msg) => {
                assert!(msg.contains("siti"));
                assert!(msg.contains(&holder.to_string()));
            }
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[test]
    fn losing_an_assign_race_maps_to_conflict() {
        let err = assign_insert_error(sqlx::Error::Database(Box::new(FakeUniqueViolation)));
        assert!(matches!(err, AppError::Conflict(_)));

        let err = assign_insert_error(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }
}
