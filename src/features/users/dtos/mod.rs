mod user_dto;

pub use user_dto::{
    CreateUserRequestDto, SetAffiliateRequestDto, UpdateUserRequestDto, UserResponseDto,
};
