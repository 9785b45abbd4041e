//! Hosting Error Types

use super::types::ProjectId;
use crate::core::error_handling::ContextualError;

#[derive(Debug, thiserror::Error)]
pub enum HostingError {
    /// Credential rejected (401/403); no further call can succeed
    #[error("Authentication rejected by {url} (HTTP {status})")]
    Auth { status: u16, url: String },

    /// The listing endpoint answered with a status outside the known set,
    /// or could not be reached at all
    #[error("Hosting endpoint unavailable at {url}: {reason}")]
    HostingUnavailable {
        url: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("Project enumeration failed on page {page}: {reason}")]
    Enumeration { page: u32, reason: String },

    #[error("Tree fetch failed for project {project_id}: {reason}")]
    TreeFetch {
        project_id: ProjectId,
        status: Option<u16>,
        reason: String,
    },

    #[error("Fetch of '{path}' in project {project_id} failed: {reason}")]
    Fetch {
        project_id: ProjectId,
        path: String,
        status: Option<u16>,
        reason: String,
    },

    #[error("Invalid hosting client setup: {message}")]
    Setup { message: String },
}

impl HostingError {
    /// Errors that terminate the whole run wherever they occur
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HostingError::Auth { .. }
                | HostingError::HostingUnavailable { .. }
                | HostingError::Setup { .. }
        )
    }

    /// HTTP status behind the error, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            HostingError::Auth { status, .. } => Some(*status),
            HostingError::HostingUnavailable { status, .. }
            | HostingError::TreeFetch { status, .. }
            | HostingError::Fetch { status, .. } => *status,
            HostingError::Enumeration { .. } | HostingError::Setup { .. } => None,
        }
    }
}

impl ContextualError for HostingError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            HostingError::Auth { .. }
                | HostingError::HostingUnavailable { .. }
                | HostingError::Enumeration { .. }
                | HostingError::Setup { .. }
        )
    }

    fn user_message(&self) -> Option<String> {
        match self {
            HostingError::Auth { status, .. } => Some(format!(
                "the access token was rejected (HTTP {}); check that it is valid and has read_api scope",
                status
            )),
            HostingError::HostingUnavailable { url, reason, .. } => {
                Some(format!("{} is not reachable as a hosting API ({})", url, reason))
            }
            HostingError::Enumeration { page, reason } => Some(format!(
                "the project listing could not be read (page {}: {})",
                page, reason
            )),
            HostingError::Setup { message } => Some(message.clone()),
            _ => None,
        }
    }
}

pub type HostingResult<T> = Result<T, HostingError>;
