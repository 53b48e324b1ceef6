mod address;
mod reward;

pub use address::{Address, AddressAgent, AddressAgentWithDetails};
pub use reward::{BalanceWithAgent, WithdrawReward, WithdrawStatus, WithdrawWithAgent};
