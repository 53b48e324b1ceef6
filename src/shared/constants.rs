/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// AUDIT ACTION KEYWORDS
// =============================================================================

pub const ACTION_CREATE: &str = "CREATE";
pub const ACTION_UPDATE: &str = "UPDATE";
pub const ACTION_APPROVE: &str = "APPROVE";
pub const ACTION_DECLINE: &str = "DECLINE";
pub const ACTION_DELETE: &str = "DELETE";
pub const ACTION_LOGIN: &str = "LOGIN";
pub const ACTION_REGISTER: &str = "REGISTER";
pub const ACTION_WITHDRAW: &str = "WITHDRAW";
pub const ACTION_ASSIGN_ADDRESS: &str = "ASSIGN_ADDRESS";
pub const ACTION_EDIT_ADDRESS: &str = "EDIT_ADDRESS";
pub const ACTION_REMOVE_ADDRESS: &str = "REMOVE_ADDRESS";
pub const ACTION_SET_AFFILIATE: &str = "SET_AFFILIATE";

// =============================================================================
// AUDIT TARGET TYPES
// =============================================================================

pub const TARGET_REPORT: &str = "REPORT";
pub const TARGET_USER: &str = "USER";
pub const TARGET_WITHDRAW: &str = "WITHDRAW";
pub const TARGET_ADDRESS_AGENT: &str = "ADDRESS_AGENT";
