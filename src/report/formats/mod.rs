//! Report formatting modules
//!
//! Each format is implemented in its own module behind `ReportFormatter`.

pub mod html;
pub mod json;

use super::error::ReportResult;
use super::evidence::EvidenceReport;
use super::format::ReportFormat;

/// Trait for report formatters
pub trait ReportFormatter {
    /// Render the report into the target format
    fn format(&self, report: &EvidenceReport) -> ReportResult<String>;

    /// Get the format type this formatter handles
    fn format_type(&self) -> ReportFormat;
}

/// Get formatter for the specified format
pub fn get_formatter(format: ReportFormat) -> Box<dyn ReportFormatter> {
    match format {
        ReportFormat::Json => Box::new(json::JsonFormatter::new()),
        ReportFormat::Html => Box::new(html::HtmlFormatter::new()),
    }
}
