pub mod document;
pub mod templates;

pub use templates::ReportRenderer;
