//! Scanner Error Types

use crate::core::error_handling::ContextualError;
use crate::hosting::error::HostingError;
use crate::scanner::types::ScanRun;

/// A fatal error that stopped the fleet scan.
///
/// Carries whatever had been aggregated before the error so the caller can
/// still report it.
#[derive(Debug, thiserror::Error)]
#[error("Scan aborted after {} of {} projects: {error}", .partial.projects_scanned(), .partial.projects_total())]
pub struct ScanAbort {
    #[source]
    pub error: HostingError,
    pub partial: ScanRun,
}

impl ScanAbort {
    pub fn new(error: HostingError, partial: ScanRun) -> Self {
        Self { error, partial }
    }

    /// Split into the cause and the partial run
    pub fn into_parts(self) -> (HostingError, ScanRun) {
        (self.error, self.partial)
    }
}

impl ContextualError for ScanAbort {
    fn is_user_actionable(&self) -> bool {
        self.error.is_user_actionable()
    }

    fn user_message(&self) -> Option<String> {
        self.error.user_message()
    }
}

pub type ScanResult<T> = Result<T, ScanAbort>;
