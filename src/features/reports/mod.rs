//! Inspection reports: draft creation with PDF rendering, admin review,
//! and the reward credit approval triggers for affiliate agents.

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;

pub use services::ReportService;
