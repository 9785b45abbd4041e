//! HTML report output from a full scan

use crate::common::{api, sample_fleet, settings_in};
use authscan::app::scan::{run_scan, ExitStatus};
use authscan::core::shutdown::ShutdownCoordinator;
use authscan::hosting::api::InMemoryHosting;
use authscan::report::ReportFormat;

#[tokio::test]
async fn test_html_report_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path(), "out/auth.html");
    assert_eq!(settings.format, ReportFormat::Html);

    let status = run_scan(api(sample_fleet()), &settings, &ShutdownCoordinator::new()).await;

    assert_eq!(status, ExitStatus::Completed);
    let html = std::fs::read_to_string(&settings.output).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Found 3 files with Keycloak configurations across 2 projects."));
    assert!(html.contains("<div class=\"project-name\">identity</div>"));
    assert!(html.contains(">keycloak.json</a><span class=\"lines\">lines 2, 3</span>"));
    assert!(!html.contains("frontend"));
}

#[tokio::test]
async fn test_html_report_for_rejected_credential() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path(), "report.html");

    let status = run_scan(
        api(InMemoryHosting::new().with_user_status(403)),
        &settings,
        &ShutdownCoordinator::new(),
    )
    .await;

    assert_eq!(status, ExitStatus::Auth);
    let html = std::fs::read_to_string(&settings.output).unwrap();
    assert!(html.contains("Authentication rejected"));
    assert!(html.contains("class=\"no-results\""));
}
