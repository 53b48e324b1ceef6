//! Infrastructure modules: adapters for external services.

pub mod pdf;
pub mod storage;
