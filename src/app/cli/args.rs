//! Core CLI arguments structure
//!
//! Global options (logging, colour, config file) and the `scan` subcommand.
//! Every scan option is optional here so that values missing on the command
//! line can still come from the TOML configuration file.

use super::validation::{parse_duration, validate_positive_int};
use crate::core::version::long_version;
use crate::report::ReportFormat;
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "authscan")]
#[command(about = "Find identity-provider configuration across a GitLab fleet")]
#[command(version = long_version())]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", global = true, value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long = "log-format", value_name = "FORMAT", global = true, value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Force colored output
    #[arg(long = "color", global = true, conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Colour preference from the config file (CLI flags take precedence)
    #[arg(skip)]
    pub config_color: Option<bool>,
}

impl GlobalArgs {
    /// Resolve colour: flags, then config file, then NO_COLOR and TTY detection
    pub fn use_color(&self) -> bool {
        if self.color {
            return true;
        }
        if self.no_color {
            return false;
        }
        if let Some(color) = self.config_color {
            return color;
        }
        std::env::var_os("NO_COLOR").is_none()
            && std::io::IsTerminal::is_terminal(&std::io::stderr())
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scan every visible project for auth configuration evidence
    Scan(ScanArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct ScanArgs {
    /// Hosting base URL (e.g. https://gitlab.example.com)
    #[arg(short = 'u', long = "url", value_name = "BASE_URL")]
    pub url: Option<String>,

    /// Access token with read_api scope
    #[arg(
        short = 't',
        long = "token",
        value_name = "TOKEN",
        env = "AUTHSCAN_TOKEN",
        hide_env_values = true
    )]
    pub token: Option<String>,

    /// Projects scanned concurrently [default: 4]
    #[arg(short = 'j', long = "concurrency", value_name = "N", value_parser = validate_positive_int)]
    pub concurrency: Option<usize>,

    /// Report format [default: from --output extension, else json]
    #[arg(short = 'F', long = "format", value_name = "FORMAT")]
    pub format: Option<ReportFormat>,

    /// Report path [default: report.json or report.html]
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Overall run timeout (e.g. 30m, 90s)
    #[arg(long = "timeout", value_name = "DURATION", value_parser = parse_duration)]
    pub timeout: Option<Duration>,

    /// Per-project timeout [default: 5m]
    #[arg(long = "project-timeout", value_name = "DURATION", value_parser = parse_duration)]
    pub project_timeout: Option<Duration>,

    /// Time in-flight projects get to finish after cancellation [default: 10s]
    #[arg(long = "grace-period", value_name = "DURATION", value_parser = parse_duration)]
    pub grace_period: Option<Duration>,

    /// Projects requested per listing page, 1-100 [default: 100]
    #[arg(long = "page-size", value_name = "N", value_parser = clap::value_parser!(u32).range(1..=100))]
    pub page_size: Option<u32>,

    /// Git reference whose files are read [default: HEAD]
    #[arg(short = 'R', long = "ref", value_name = "REF")]
    pub git_ref: Option<String>,

    /// Scan every visible project, not only those the token's user is a member of
    #[arg(long = "all-projects")]
    pub all_projects: bool,

    /// Select configuration files only, skipping source files
    #[arg(long = "config-only")]
    pub config_only: bool,

    /// Path globs to skip*
    #[arg(short = 'N', long = "exclude-paths", value_name = "GLOBS", action = ArgAction::Append)]
    pub exclude_paths: Vec<String>,

    /// Extra keywords to match*
    #[arg(short = 'k', long = "keyword", value_name = "WORDS", action = ArgAction::Append)]
    pub keywords: Vec<String>,

    /// Retry responses with statuses the hosting API does not document
    #[arg(long = "retry-unknown-status")]
    pub retry_unknown_status: bool,

    /// Attempts per request, including the first [default: 3]
    #[arg(long = "max-retries", value_name = "N", value_parser = validate_positive_int)]
    pub max_retries: Option<usize>,
}
