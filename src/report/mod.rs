//! Evidence Report
//!
//! Turns a `ScanRun` into the report written at the end of a scan: a JSON
//! array of per-project records, or an HTML page.

pub mod error;
pub mod evidence;
pub mod format;
pub mod formats;
pub mod record;

pub use error::{ReportError, ReportResult};
pub use evidence::EvidenceReport;
pub use format::ReportFormat;
pub use formats::{get_formatter, ReportFormatter};
pub use record::ProjectRecord;
