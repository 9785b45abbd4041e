//! CLI argument parsing tests

use authscan::app::cli::args::*;
use authscan::report::ReportFormat;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

fn scan_args(cli: Cli) -> ScanArgs {
    match cli.command {
        Command::Scan(args) => args,
    }
}

#[test]
fn test_minimal_scan_command() {
    let cli = parse(&["authscan", "scan", "--url", "https://gitlab.example.com", "--token", "abc"]);
    let args = scan_args(cli);

    assert_eq!(args.url.as_deref(), Some("https://gitlab.example.com"));
    assert_eq!(args.token.as_deref(), Some("abc"));
    assert!(args.concurrency.is_none());
    assert!(args.format.is_none());
    assert!(!args.all_projects);
    assert!(args.exclude_paths.is_empty());
}

#[test]
fn test_short_options() {
    let cli = parse(&[
        "authscan", "scan", "-u", "https://git.example.com", "-t", "tok", "-j", "8", "-F", "html",
        "-o", "out/report.html", "-R", "main",
    ]);
    let args = scan_args(cli);

    assert_eq!(args.concurrency, Some(8));
    assert_eq!(args.format, Some(ReportFormat::Html));
    assert_eq!(args.output, Some(PathBuf::from("out/report.html")));
    assert_eq!(args.git_ref.as_deref(), Some("main"));
}

#[test]
fn test_durations_and_paging() {
    let cli = parse(&[
        "authscan", "scan", "--timeout", "30m", "--project-timeout", "90s", "--grace-period",
        "500ms", "--page-size", "50",
    ]);
    let args = scan_args(cli);

    assert_eq!(args.timeout, Some(Duration::from_secs(1800)));
    assert_eq!(args.project_timeout, Some(Duration::from_secs(90)));
    assert_eq!(args.grace_period, Some(Duration::from_millis(500)));
    assert_eq!(args.page_size, Some(50));
}

#[test]
fn test_repeatable_lists_and_flags() {
    let cli = parse(&[
        "authscan", "scan", "-N", "vendor/**,node_modules/**", "-N", "third_party/**", "-k", "dex",
        "--keyword", "pingfederate", "--all-projects", "--config-only", "--retry-unknown-status",
        "--max-retries", "5",
    ]);
    let args = scan_args(cli);

    assert_eq!(args.exclude_paths, vec!["vendor/**,node_modules/**", "third_party/**"]);
    assert_eq!(args.keywords, vec!["dex", "pingfederate"]);
    assert!(args.all_projects);
    assert!(args.config_only);
    assert!(args.retry_unknown_status);
    assert_eq!(args.max_retries, Some(5));
}

#[test]
fn test_global_options_before_and_after_subcommand() {
    let before = parse(&["authscan", "--log-level", "debug", "--no-color", "scan"]);
    assert_eq!(before.global.log_level.as_deref(), Some("debug"));
    assert!(before.global.no_color);
    assert!(!before.global.use_color());

    let after = parse(&["authscan", "scan", "--log-format", "json", "-c", "my.toml", "--color"]);
    assert_eq!(after.global.log_format.as_deref(), Some("json"));
    assert_eq!(after.global.config_file, Some(PathBuf::from("my.toml")));
    assert!(after.global.use_color());
}

#[test]
fn test_subcommand_is_required() {
    assert!(Cli::try_parse_from(["authscan"]).is_err());
    assert!(Cli::try_parse_from(["authscan", "commits"]).is_err());
}
