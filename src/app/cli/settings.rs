//! Resolved scan settings
//!
//! The fully validated result of command line, environment and TOML values,
//! and the component settings built from it.

use super::args::ScanArgs;
use super::error::{ConfigError, ConfigResult};
use super::validation::{
    mask_token, split_comma_separated, validate_base_url, validate_glob_pattern,
};
use crate::core::retry::RetryPolicy;
use crate::hosting::client::GitLabSettings;
use crate::report::ReportFormat;
use crate::scanner::fleet::{
    FleetScanner, FleetSettings, DEFAULT_CONCURRENCY, DEFAULT_GRACE_PERIOD, DEFAULT_PAGE_SIZE,
    DEFAULT_PROJECT_TIMEOUT,
};
use crate::scanner::matcher::ContentMatcher;
use crate::scanner::project::ProjectScanner;
use crate::scanner::select::CandidateSelector;
use std::path::PathBuf;
use std::time::Duration;

/// Secondary environment variable consulted for the token
pub const FALLBACK_TOKEN_ENV: &str = "GITLAB_TOKEN";

pub const DEFAULT_REF: &str = "HEAD";

#[derive(Clone)]
pub struct ScanSettings {
    pub base_url: String,
    pub token: String,
    pub concurrency: usize,
    pub format: ReportFormat,
    pub output: PathBuf,
    pub timeout: Option<Duration>,
    pub project_timeout: Duration,
    pub grace_period: Duration,
    pub page_size: u32,
    pub git_ref: String,
    pub membership_only: bool,
    pub config_only: bool,
    pub exclude_paths: Vec<glob::Pattern>,
    pub keywords: Vec<String>,
    pub retry_unknown_status: bool,
    pub max_retries: Option<usize>,
}

// Hand-written so the token never reaches debug output
impl std::fmt::Debug for ScanSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanSettings")
            .field("base_url", &self.base_url)
            .field("token", &mask_token(&self.token))
            .field("concurrency", &self.concurrency)
            .field("format", &self.format)
            .field("output", &self.output)
            .field("timeout", &self.timeout)
            .field("project_timeout", &self.project_timeout)
            .field("grace_period", &self.grace_period)
            .field("page_size", &self.page_size)
            .field("git_ref", &self.git_ref)
            .field("membership_only", &self.membership_only)
            .field("config_only", &self.config_only)
            .field("exclude_paths", &self.exclude_paths)
            .field("keywords", &self.keywords)
            .field("retry_unknown_status", &self.retry_unknown_status)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl ScanArgs {
    /// Validate and fill defaults. `fallback_token` is used when neither the
    /// command line, `AUTHSCAN_TOKEN` nor the config file supplied one.
    pub fn resolve(self, fallback_token: Option<String>) -> ConfigResult<ScanSettings> {
        let url = self.url.ok_or_else(|| {
            ConfigError::missing("url", "pass --url or set url in the config file")
        })?;
        let base_url =
            validate_base_url(&url).map_err(|message| ConfigError::invalid("url", message))?;

        let token = self
            .token
            .or(fallback_token)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ConfigError::missing(
                    "token",
                    "pass --token or set AUTHSCAN_TOKEN / GITLAB_TOKEN",
                )
            })?;

        let format = match (self.format, &self.output) {
            (Some(format), _) => format,
            (None, Some(path)) => ReportFormat::from_file_path(path).unwrap_or_default(),
            (None, None) => ReportFormat::default(),
        };
        let output = self
            .output
            .unwrap_or_else(|| PathBuf::from(format.default_output()));

        let exclude_paths = split_comma_separated(&self.exclude_paths)
            .iter()
            .map(|pattern| validate_glob_pattern(pattern))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|message| ConfigError::invalid("exclude-paths", message))?;
        let keywords = split_comma_separated(&self.keywords);
        // Reject keywords the matcher cannot compile up front
        ContentMatcher::with_extra_keywords(&keywords)
            .map_err(|e| ConfigError::invalid("keyword", e.to_string()))?;

        let git_ref = self
            .git_ref
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REF.to_string());

        Ok(ScanSettings {
            base_url,
            token,
            concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            format,
            output,
            timeout: self.timeout,
            project_timeout: self.project_timeout.unwrap_or(DEFAULT_PROJECT_TIMEOUT),
            grace_period: self.grace_period.unwrap_or(DEFAULT_GRACE_PERIOD),
            page_size: self.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            git_ref,
            membership_only: !self.all_projects,
            config_only: self.config_only,
            exclude_paths,
            keywords,
            retry_unknown_status: self.retry_unknown_status,
            max_retries: self.max_retries,
        })
    }
}

impl ScanSettings {
    pub fn gitlab_settings(&self) -> GitLabSettings {
        let mut retry = RetryPolicy::default();
        if let Some(attempts) = self.max_retries {
            retry.max_attempts = attempts;
        }

        let mut settings = GitLabSettings::new(self.base_url.as_str(), self.token.as_str());
        settings.git_ref = self.git_ref.clone();
        settings.membership_only = self.membership_only;
        settings.retry = retry;
        settings.retry_unknown_status = self.retry_unknown_status;
        settings
    }

    pub fn fleet_settings(&self) -> FleetSettings {
        FleetSettings {
            concurrency: self.concurrency,
            page_size: self.page_size,
            project_timeout: self.project_timeout,
            grace_period: self.grace_period,
            ..FleetSettings::default()
        }
    }

    pub fn project_scanner(&self) -> ProjectScanner {
        let mut selector = CandidateSelector::new().with_exclusions(self.exclude_paths.clone());
        if self.config_only {
            selector = selector.config_only();
        }
        // Keywords were compiled once during resolution
        let matcher = ContentMatcher::with_extra_keywords(&self.keywords).unwrap_or_default();
        ProjectScanner::new(selector, matcher)
    }

    pub fn fleet_scanner(&self) -> FleetScanner {
        FleetScanner::new(
            self.project_scanner(),
            self.fleet_settings(),
            self.base_url.as_str(),
            self.git_ref.as_str(),
        )
    }
}
