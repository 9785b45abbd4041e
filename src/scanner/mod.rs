//! Scanner Component
//!
//! Finds auth/identity configuration evidence across the fleet:
//!
//! - **CandidateSelector**: path-only choice of files worth fetching
//! - **ContentMatcher**: keyword search returning matching line numbers
//! - **ProjectScanner**: tree listing, candidate fetches and matching for one project
//! - **FleetScanner**: bounded-concurrency scan of every enumerated project,
//!   aggregated into a single `ScanRun`

pub mod api;
pub mod error;
pub mod fleet;
pub mod matcher;
pub mod project;
pub mod select;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{ScanAbort, ScanResult};
pub use fleet::{FleetScanner, FleetSettings};
pub use matcher::ContentMatcher;
pub use project::{ProjectScan, ProjectScanner};
pub use select::CandidateSelector;
pub use types::{FailureKind, MatchEvidence, ProjectEvidence, ScanFailure, ScanRun};
