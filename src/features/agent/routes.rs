use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::agent::handlers;
use crate::features::agent::services::{AssignmentService, RewardService};

/// Shared state for the agent feature's routers
#[derive(Clone)]
pub struct AgentState {
    pub assignments: Arc<AssignmentService>,
    pub rewards: Arc<RewardService>,
}

/// Routes for the agent feature (all require authentication)
pub fn routes(state: AgentState) -> Router {
    Router::new()
        .route("/agent/addresses", get(handlers::search_addresses))
        .route("/agent/address", post(handlers::assign_address))
        .route(
            "/agent/address/{link_id}",
            put(handlers::edit_address_link).delete(handlers::remove_address_link),
        )
        .route("/agent/status", get(handlers::agent_status))
        .route("/agent/withdraw", post(handlers::submit_withdrawal))
        .route("/agent/withdrawals", get(handlers::list_withdrawals))
        .route(
            "/agent/withdrawals/{id}/approve",
            post(handlers::approve_withdrawal),
        )
        .route(
            "/agent/withdrawals/{id}/deny",
            post(handlers::deny_withdrawal),
        )
        .route("/agent/rewards", get(handlers::list_rewards))
        .with_state(state)
}
