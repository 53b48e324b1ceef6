mod report;

pub use report::{Report, ReportStatus, ReportType, ReportWithAddress};
