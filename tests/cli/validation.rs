//! Argument validation tests
//!
//! Values clap rejects while parsing, and values rejected when the scan
//! settings are resolved.

use authscan::app::cli::args::*;
use authscan::app::cli::error::ConfigError;
use authscan::report::ReportFormat;
use clap::Parser;
use std::path::PathBuf;

fn rejects(args: &[&str]) {
    assert!(Cli::try_parse_from(args).is_err(), "expected {:?} to be rejected", args);
}

fn base_args() -> ScanArgs {
    ScanArgs {
        url: Some("https://gitlab.example.com".into()),
        token: Some("glpat-abcdefghijklmnop".into()),
        ..ScanArgs::default()
    }
}

#[test]
fn test_concurrency_must_be_positive() {
    rejects(&["authscan", "scan", "--concurrency", "0"]);
    rejects(&["authscan", "scan", "--concurrency", "-2"]);
    rejects(&["authscan", "scan", "--concurrency", "many"]);
}

#[test]
fn test_page_size_range() {
    rejects(&["authscan", "scan", "--page-size", "0"]);
    rejects(&["authscan", "scan", "--page-size", "101"]);
}

#[test]
fn test_bad_durations_and_formats() {
    rejects(&["authscan", "scan", "--timeout", "soon"]);
    rejects(&["authscan", "scan", "--timeout", "0s"]);
    rejects(&["authscan", "scan", "--format", "pdf"]);
    rejects(&["authscan", "--log-level", "verbose", "scan"]);
    rejects(&["authscan", "--color", "--no-color", "scan"]);
}

#[test]
fn test_resolution_requires_url_and_token() {
    let no_url = ScanArgs { url: None, ..base_args() }.resolve(None);
    assert!(matches!(no_url, Err(ConfigError::Missing { ref option, .. }) if option == "url"));

    let no_token = ScanArgs { token: None, ..base_args() }.resolve(None);
    assert!(matches!(no_token, Err(ConfigError::Missing { ref option, .. }) if option == "token"));
}

#[test]
fn test_resolution_rejects_non_http_url() {
    let result = ScanArgs {
        url: Some("ftp://gitlab.example.com".into()),
        ..base_args()
    }
    .resolve(None);
    assert!(matches!(result, Err(ConfigError::Invalid { ref option, .. }) if option == "url"));
}

#[test]
fn test_resolution_from_parsed_command_line() {
    let cli = Cli::try_parse_from([
        "authscan", "scan", "-u", "https://gitlab.example.com/", "-t", "glpat-abcdefghijklmnop",
        "-o", "reports/auth.html", "-N", "vendor/**", "-k", "dex,dex",
    ])
    .unwrap();
    let Command::Scan(args) = cli.command;
    let settings = args.resolve(None).unwrap();

    assert_eq!(settings.base_url, "https://gitlab.example.com");
    assert_eq!(settings.format, ReportFormat::Html);
    assert_eq!(settings.output, PathBuf::from("reports/auth.html"));
    assert_eq!(settings.exclude_paths.len(), 1);
    assert_eq!(settings.keywords, vec!["dex"]);
    assert!(settings.membership_only);
}
