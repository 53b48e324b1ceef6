//! Agent workspace: address assignment, the reward balance ledger, and
//! the withdrawal workflow.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::{AssignmentService, RewardService};
