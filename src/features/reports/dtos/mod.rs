mod report_dto;

pub use report_dto::{
    ApproveReportRequestDto, CreateReportRequestDto, DeclineReportRequestDto,
    PresignUploadRequestDto, PresignUploadResponseDto, ReportResponseDto, UpdateReportRequestDto,
};
