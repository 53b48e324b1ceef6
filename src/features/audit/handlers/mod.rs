pub mod audit_handler;

pub use audit_handler::{__path_list_audit_logs, list_audit_logs};
