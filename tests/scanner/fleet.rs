//! Scan command runs over the in-memory backend
//!
//! Exit statuses and the report contents for completed and aborted runs.

use crate::common::{api, read_json, sample_fleet, settings_in};
use authscan::app::scan::{run_scan, ExitStatus};
use authscan::core::shutdown::ShutdownCoordinator;
use authscan::hosting::api::InMemoryHosting;
use serde_json::json;

#[tokio::test]
async fn test_completed_run_writes_json_records() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path(), "report.json");

    let status = run_scan(api(sample_fleet()), &settings, &ShutdownCoordinator::new()).await;

    assert_eq!(status, ExitStatus::Completed);
    let report = read_json(&settings.output);
    assert_eq!(
        report,
        json!([
            {
                "project_name": "identity",
                "repository_url": "https://git.example.com/group/identity",
                "keycloak_files": ["config/app.yml", "keycloak.json"],
                "file_urls": [
                    "https://git.example.com/group/identity/-/blob/HEAD/config/app.yml",
                    "https://git.example.com/group/identity/-/blob/HEAD/keycloak.json"
                ],
                "line_numbers": [[3], [2, 3]]
            },
            {
                "project_name": "gateway",
                "repository_url": "https://git.example.com/group/gateway",
                "keycloak_files": ["deploy/values.yaml"],
                "file_urls": ["https://git.example.com/group/gateway/-/blob/HEAD/deploy/values.yaml"],
                "line_numbers": [[2]]
            }
        ])
    );
}

#[tokio::test]
async fn test_empty_fleet_writes_empty_array() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path(), "report.json");

    let status = run_scan(
        api(InMemoryHosting::new()),
        &settings,
        &ShutdownCoordinator::new(),
    )
    .await;

    assert_eq!(status, ExitStatus::Completed);
    assert_eq!(std::fs::read_to_string(&settings.output).unwrap().trim(), "[]");
}

#[tokio::test]
async fn test_rejected_credential_exits_with_auth_status() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path(), "report.json");
    let hosting = sample_fleet().with_user_status(401);

    let status = run_scan(api(hosting), &settings, &ShutdownCoordinator::new()).await;

    assert_eq!(status, ExitStatus::Auth);
    assert_ne!(status.code(), 0);
    // The report is still valid, just empty
    assert_eq!(read_json(&settings.output), json!([]));
}

#[tokio::test]
async fn test_unavailable_listing_exits_with_hosting_status() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path(), "report.json");
    let hosting = sample_fleet().fail_listing_page(1, 445);

    let status = run_scan(api(hosting), &settings, &ShutdownCoordinator::new()).await;

    assert_eq!(status, ExitStatus::HostingUnavailable);
    assert_eq!(read_json(&settings.output), json!([]));
}

#[tokio::test]
async fn test_first_page_failure_exits_with_enumeration_status() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path(), "report.json");
    let hosting = sample_fleet().fail_listing_page(1, 404);

    let status = run_scan(api(hosting), &settings, &ShutdownCoordinator::new()).await;

    assert_eq!(status, ExitStatus::Enumeration);
}

#[tokio::test]
async fn test_mid_run_auth_failure_keeps_partial_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = settings_in(dir.path(), "report.json");
    settings.concurrency = 1;
    let hosting = sample_fleet().fail_tree(13, 403);

    let status = run_scan(api(hosting), &settings, &ShutdownCoordinator::new()).await;

    assert_eq!(status, ExitStatus::Auth);
    let report = read_json(&settings.output);
    let names: Vec<&str> = report
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["project_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["identity"]);
}

#[tokio::test]
async fn test_per_project_failures_do_not_change_exit_status() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path(), "report.json");
    let hosting = sample_fleet()
        .fail_tree(11, 500)
        .fail_file(13, "deploy/values.yaml", 404);

    let status = run_scan(api(hosting), &settings, &ShutdownCoordinator::new()).await;

    assert_eq!(status, ExitStatus::Completed);
    assert_eq!(read_json(&settings.output), json!([]));
}

#[tokio::test]
async fn test_cancelled_run_still_completes() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_in(dir.path(), "report.json");
    let shutdown = ShutdownCoordinator::new();
    shutdown.trigger_shutdown(authscan::core::shutdown::ShutdownReason::Requested);

    let status = run_scan(api(sample_fleet()), &settings, &shutdown).await;

    assert_eq!(status, ExitStatus::Completed);
    assert_eq!(read_json(&settings.output), json!([]));
}

#[tokio::test]
async fn test_unwritable_output_reports_write_failure() {
    let dir = tempfile::tempdir().unwrap();
    // A regular file where the report's parent directory should be
    let blocker = dir.path().join("taken");
    std::fs::write(&blocker, "x").unwrap();
    let settings = settings_in(&blocker, "report.json");

    let status = run_scan(api(sample_fleet()), &settings, &ShutdownCoordinator::new()).await;

    assert_eq!(status, ExitStatus::ReportWrite);
    assert_eq!(status.code(), 1);
}

#[tokio::test]
async fn test_repeated_runs_produce_identical_reports() {
    let dir = tempfile::tempdir().unwrap();
    let first = settings_in(dir.path(), "first.json");
    let second = settings_in(dir.path(), "second.json");

    run_scan(api(sample_fleet()), &first, &ShutdownCoordinator::new()).await;
    run_scan(api(sample_fleet()), &second, &ShutdownCoordinator::new()).await;

    assert_eq!(read_json(&first.output), read_json(&second.output));
}
