//! Configuration Error Types

use crate::core::error_handling::ContextualError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for '{option}': {message}")]
    Invalid { option: String, message: String },

    #[error("Missing required option '{option}'")]
    Missing { option: String, hint: String },

    #[error("Configuration file {} could not be read: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    #[error("Configuration file {} is not valid TOML: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

impl ConfigError {
    pub fn invalid(option: &str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            option: option.to_string(),
            message: message.into(),
        }
    }

    pub fn missing(option: &str, hint: impl Into<String>) -> Self {
        ConfigError::Missing {
            option: option.to_string(),
            hint: hint.into(),
        }
    }
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<String> {
        match self {
            ConfigError::Missing { option, hint } => {
                Some(format!("missing required option '{}' ({})", option, hint))
            }
            other => Some(other.to_string()),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
