//! Authentication feature: credential exchange, token refresh, and the
//! role guards used by the rest of the API.

pub mod dtos;
pub mod guards;
pub mod handlers;
pub mod model;
pub mod routes;
pub mod services;
