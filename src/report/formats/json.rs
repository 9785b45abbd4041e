//! JSON report formatter
//!
//! The document is a top-level array of project records; `[]` when nothing
//! was found.

use super::ReportFormatter;
use crate::report::error::ReportResult;
use crate::report::evidence::EvidenceReport;
use crate::report::format::ReportFormat;

pub struct JsonFormatter {
    pretty: bool,
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn new_compact() -> Self {
        Self { pretty: false }
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &EvidenceReport) -> ReportResult<String> {
        let mut output = if self.pretty {
            serde_json::to_string_pretty(&report.records)?
        } else {
            serde_json::to_string(&report.records)?
        };
        output.push('\n');
        Ok(output)
    }

    fn format_type(&self) -> ReportFormat {
        ReportFormat::Json
    }
}
