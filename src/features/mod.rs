pub mod agent;
pub mod audit;
pub mod auth;
pub mod reports;
pub mod users;
