mod agent_dto;

pub use agent_dto::{
    AddressAgentResponseDto, AddressResponseDto, AddressSearchQuery, AgentRewardResponseDto,
    AgentStatusResponseDto, ApproveWithdrawalRequestDto, AssignAddressRequestDto,
    EditAddressLinkRequestDto, WithdrawRequestDto, WithdrawalFilter, WithdrawalResponseDto,
};
