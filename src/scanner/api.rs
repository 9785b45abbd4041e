//! Scanner API
//!
//! Public surface of the scanner system, in the same shape as `hosting::api`.

pub use crate::scanner::error::{ScanAbort, ScanResult};
pub use crate::scanner::fleet::{
    FleetScanner, FleetSettings, DEFAULT_CONCURRENCY, DEFAULT_GRACE_PERIOD, DEFAULT_PAGE_SIZE,
    DEFAULT_PROJECT_TIMEOUT,
};
pub use crate::scanner::matcher::{ContentMatcher, DecodeError, DEFAULT_KEYWORDS};
pub use crate::scanner::project::{ProjectScan, ProjectScanner};
pub use crate::scanner::select::CandidateSelector;
pub use crate::scanner::types::{
    blob_url, FailureKind, MatchEvidence, ProjectEvidence, ScanFailure, ScanRun, ScanRunBuilder,
};
