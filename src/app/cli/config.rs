//! TOML configuration file parsing and loading
//!
//! Keys mirror the long option names. A value from the file only fills an
//! option the command line left unset.

use super::args::{GlobalArgs, ScanArgs};
use super::error::{ConfigError, ConfigResult};
use super::validation::{parse_duration, split_comma_separated};
use crate::report::ReportFormat;
use std::path::{Path, PathBuf};

/// `<config dir>/Authscan/authscan.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("Authscan").join("authscan.toml"))
}

/// Load the explicit config file, or the default one if it exists.
///
/// An explicitly named file must exist; a missing default file is not an error.
pub async fn load_config_file(config_file: Option<&Path>) -> ConfigResult<Option<toml::Table>> {
    let path = match config_file {
        Some(path) => path.to_path_buf(),
        None => match default_config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(None),
        },
    };

    let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|e| ConfigError::Read {
            path: path.clone(),
            message: e.to_string(),
        })?;
    let table = toml::from_str::<toml::Table>(&contents).map_err(|e| ConfigError::Parse {
        path: path.clone(),
        message: e.to_string(),
    })?;

    log::debug!("Loaded configuration from {}", path.display());
    Ok(Some(table))
}

fn get_str<'a>(config: &'a toml::Table, key: &str) -> ConfigResult<Option<&'a str>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or_else(|| ConfigError::invalid(key, "expected a string")),
    }
}

fn get_bool(config: &toml::Table, key: &str) -> ConfigResult<Option<bool>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_bool()
            .map(Some)
            .ok_or_else(|| ConfigError::invalid(key, "expected true or false")),
    }
}

fn get_positive(config: &toml::Table, key: &str) -> ConfigResult<Option<u64>> {
    match config.get(key) {
        None => Ok(None),
        Some(value) => match value.as_integer() {
            Some(n) if n > 0 => Ok(Some(n as u64)),
            Some(_) => Err(ConfigError::invalid(key, "must be greater than 0")),
            None => Err(ConfigError::invalid(key, "expected an integer")),
        },
    }
}

fn get_duration(config: &toml::Table, key: &str) -> ConfigResult<Option<std::time::Duration>> {
    get_str(config, key)?
        .map(|value| parse_duration(value).map_err(|message| ConfigError::invalid(key, message)))
        .transpose()
}

/// Apply string array field (handles both single string and array formats)
fn get_string_list(config: &toml::Table, key: &str) -> ConfigResult<Vec<String>> {
    let raw = match config.get(key) {
        None => return Ok(Vec::new()),
        Some(toml::Value::String(value)) => vec![value.clone()],
        Some(toml::Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ConfigError::invalid(key, "expected a list of strings"))
            })
            .collect::<ConfigResult<Vec<_>>>()?,
        Some(_) => return Err(ConfigError::invalid(key, "expected a string or list of strings")),
    };
    Ok(split_comma_separated(&raw))
}

impl GlobalArgs {
    /// Apply TOML configuration values to unset global options
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> ConfigResult<()> {
        if self.log_level.is_none() {
            if let Some(level) = get_str(config, "log-level")? {
                if !["trace", "debug", "info", "warn", "error", "off"].contains(&level) {
                    return Err(ConfigError::invalid(
                        "log-level",
                        format!("unknown level '{}'", level),
                    ));
                }
                self.log_level = Some(level.to_string());
            }
        }
        if self.log_format.is_none() {
            if let Some(format) = get_str(config, "log-format")? {
                if !["text", "ext", "json"].contains(&format) {
                    return Err(ConfigError::invalid(
                        "log-format",
                        format!("unknown format '{}'", format),
                    ));
                }
                self.log_format = Some(format.to_string());
            }
        }
        if self.log_file.is_none() {
            if let Some(log_file) = get_str(config, "log-file")? {
                // "none" and "-" disable file logging
                if !log_file.eq_ignore_ascii_case("none") && log_file != "-" {
                    self.log_file = Some(PathBuf::from(log_file));
                }
            }
        }
        self.config_color = get_bool(config, "color")?;
        Ok(())
    }
}

impl ScanArgs {
    /// Apply TOML configuration values to unset scan options
    pub fn apply_toml_values(&mut self, config: &toml::Table) -> ConfigResult<()> {
        if self.url.is_none() {
            self.url = get_str(config, "url")?.map(str::to_string);
        }
        if self.token.is_none() {
            self.token = get_str(config, "token")?.map(str::to_string);
        }
        if self.concurrency.is_none() {
            self.concurrency = get_positive(config, "concurrency")?.map(|n| n as usize);
        }
        if self.format.is_none() {
            if let Some(name) = get_str(config, "format")? {
                let format = ReportFormat::from_name(name).ok_or_else(|| {
                    ConfigError::invalid("format", format!("unknown report format '{}'", name))
                })?;
                self.format = Some(format);
            }
        }
        if self.output.is_none() {
            self.output = get_str(config, "output")?.map(PathBuf::from);
        }
        if self.timeout.is_none() {
            self.timeout = get_duration(config, "timeout")?;
        }
        if self.project_timeout.is_none() {
            self.project_timeout = get_duration(config, "project-timeout")?;
        }
        if self.grace_period.is_none() {
            self.grace_period = get_duration(config, "grace-period")?;
        }
        if self.page_size.is_none() {
            if let Some(size) = get_positive(config, "page-size")? {
                if size > 100 {
                    return Err(ConfigError::invalid("page-size", "must be between 1 and 100"));
                }
                self.page_size = Some(size as u32);
            }
        }
        if self.git_ref.is_none() {
            self.git_ref = get_str(config, "ref")?.map(str::to_string);
        }
        if self.max_retries.is_none() {
            self.max_retries = get_positive(config, "max-retries")?.map(|n| n as usize);
        }

        // Flags can only be switched on from the file
        self.all_projects |= get_bool(config, "all-projects")?.unwrap_or(false);
        self.config_only |= get_bool(config, "config-only")?.unwrap_or(false);
        self.retry_unknown_status |= get_bool(config, "retry-unknown-status")?.unwrap_or(false);

        // Lists from the file come first, command line entries follow
        let mut exclude_paths = get_string_list(config, "exclude-paths")?;
        exclude_paths.append(&mut self.exclude_paths);
        self.exclude_paths = exclude_paths;

        let mut keywords = get_string_list(config, "keywords")?;
        keywords.append(&mut self.keywords);
        self.keywords = keywords;

        Ok(())
    }
}
