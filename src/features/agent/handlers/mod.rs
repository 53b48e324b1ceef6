mod agent_handler;

pub use agent_handler::*;
