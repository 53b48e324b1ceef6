mod assignment_service;
mod reward_service;

pub use assignment_service::AssignmentService;
pub use reward_service::RewardService;
