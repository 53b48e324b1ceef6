//! User account management: admin CRUD and the affiliate flag that
//! gates reward accrual for agents.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::UserService;
