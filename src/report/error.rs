//! Report Error Types

use crate::core::error_handling::ContextualError;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Failed to serialise report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to render HTML report: {0}")]
    Render(#[from] tera::Error),

    #[error("Failed to write report to '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ContextualError for ReportError {
    fn is_user_actionable(&self) -> bool {
        matches!(self, ReportError::Write { .. })
    }

    fn user_message(&self) -> Option<String> {
        match self {
            ReportError::Write { path, source } => {
                Some(format!("cannot write '{}': {}", path, source))
            }
            _ => None,
        }
    }
}

pub type ReportResult<T> = Result<T, ReportError>;
