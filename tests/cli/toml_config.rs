//! CLI TOML configuration tests
//!
//! Loading the configuration file and merging it under command line values.

use authscan::app::cli::args::*;
use authscan::app::cli::config::load_config_file;
use authscan::app::cli::error::ConfigError;
use authscan::report::ReportFormat;
use clap::Parser;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn scan_args(cli: Cli) -> ScanArgs {
    match cli.command {
        Command::Scan(args) => args,
    }
}

#[tokio::test]
async fn test_config_file_fills_unset_options() {
    let file = config_file(
        r#"
url = "https://gitlab.example.com"
token = "from-config-file-token"
concurrency = 6
format = "html"
timeout = "45m"
all-projects = true
exclude-paths = ["vendor/**", "dist/**"]
keywords = "dex"
log-level = "warn"
"#,
    );
    let config = load_config_file(Some(file.path())).await.unwrap().unwrap();

    let mut cli = Cli::try_parse_from(["authscan", "scan"]).unwrap();
    cli.global.apply_toml_values(&config).unwrap();
    let mut args = scan_args(cli.clone());
    args.apply_toml_values(&config).unwrap();

    assert_eq!(cli.global.log_level.as_deref(), Some("warn"));
    assert_eq!(args.url.as_deref(), Some("https://gitlab.example.com"));
    assert_eq!(args.concurrency, Some(6));
    assert_eq!(args.format, Some(ReportFormat::Html));
    assert_eq!(args.timeout, Some(Duration::from_secs(45 * 60)));
    assert!(args.all_projects);
    assert_eq!(args.exclude_paths, vec!["vendor/**", "dist/**"]);
    assert_eq!(args.keywords, vec!["dex"]);
}

#[tokio::test]
async fn test_command_line_overrides_config_file() {
    let file = config_file("concurrency = 6\nref = \"develop\"\nkeywords = [\"dex\"]\n");
    let config = load_config_file(Some(file.path())).await.unwrap().unwrap();

    let cli =
        Cli::try_parse_from(["authscan", "scan", "-j", "2", "-R", "main", "-k", "okta"]).unwrap();
    let mut args = scan_args(cli);
    args.apply_toml_values(&config).unwrap();

    assert_eq!(args.concurrency, Some(2));
    assert_eq!(args.git_ref.as_deref(), Some("main"));
    assert_eq!(args.keywords, vec!["dex", "okta"]);
}

#[tokio::test]
async fn test_explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");

    let result = load_config_file(Some(&missing)).await;
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[tokio::test]
async fn test_malformed_file_is_an_error() {
    let file = config_file("url = \n[[[");
    let result = load_config_file(Some(file.path())).await;
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[tokio::test]
async fn test_wrong_value_types_are_rejected() {
    let file = config_file("concurrency = \"lots\"\n");
    let config = load_config_file(Some(file.path())).await.unwrap().unwrap();

    let mut args = ScanArgs::default();
    let result = args.apply_toml_values(&config);
    assert!(matches!(
        result,
        Err(ConfigError::Invalid { ref option, .. }) if option == "concurrency"
    ));
}
