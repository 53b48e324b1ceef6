//! Append-only audit trail of privileged actions.
//!
//! Every mutating operation appends one record capturing the acting
//! user, an action keyword, and the target. Read access is admin-only.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::AuditService;
