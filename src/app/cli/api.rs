//! Public API exports for the CLI module

pub use crate::app::cli::args::{Cli, Command, GlobalArgs, ScanArgs};
pub use crate::app::cli::config::{default_config_path, load_config_file};
pub use crate::app::cli::error::{ConfigError, ConfigResult};
pub use crate::app::cli::settings::{ScanSettings, DEFAULT_REF, FALLBACK_TOKEN_ENV};
pub use crate::app::cli::validation::{mask_token, parse_duration};
