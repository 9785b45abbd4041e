//! Tests for ProjectScanner

use crate::hosting::error::HostingError;
use crate::hosting::memory::InMemoryHosting;
use crate::hosting::types::FileEntry;
use crate::scanner::matcher::ContentMatcher;
use crate::scanner::project::ProjectScanner;
use crate::scanner::select::CandidateSelector;
use crate::scanner::tests::helpers::APP_YML;
use std::sync::Arc;

fn project(id: u64) -> Arc<crate::hosting::types::Project> {
    Arc::new(InMemoryHosting::project(id, &format!("p{}", id)))
}

#[tokio::test]
async fn test_config_file_with_realm_on_line_three() {
    let hosting = InMemoryHosting::new().with_project(
        InMemoryHosting::project(1, "p1"),
        &[("config/app.yml", APP_YML), ("README.md", "realm is mentioned here\n")],
    );

    let scan = ProjectScanner::default()
        .scan_project(&hosting, project(1))
        .await
        .unwrap();

    let evidence = scan.evidence.expect("expected evidence");
    assert_eq!(evidence.files.len(), 1);
    assert_eq!(evidence.files[0].path, "config/app.yml");
    assert_eq!(evidence.files[0].line_numbers, vec![3]);
    // README.md is never a candidate, so it is never fetched
    assert_eq!(hosting.raw_fetch_count(), 1);
    assert_eq!(scan.candidates, 1);
    assert!(scan.skipped_files.is_empty());
}

#[tokio::test]
async fn test_project_without_candidates_fetches_nothing() {
    let hosting = InMemoryHosting::new().with_project(
        InMemoryHosting::project(1, "p1"),
        &[("README.md", "keycloak"), ("src/lib.rs", "// oauth\n")],
    );

    let scan = ProjectScanner::default()
        .scan_project(&hosting, project(1))
        .await
        .unwrap();

    assert!(scan.evidence.is_none());
    assert_eq!(hosting.raw_fetch_count(), 0);
}

#[tokio::test]
async fn test_evidence_follows_selection_order() {
    let hosting = InMemoryHosting::new().with_project(
        InMemoryHosting::project(1, "p1"),
        &[
            ("z/settings.json", "{\"oidc\": true}\n"),
            ("a/app.yml", "name: x\n"),
            ("b/auth.properties", "x=1\nclient_id=web\n"),
        ],
    );

    let scan = ProjectScanner::default()
        .scan_project(&hosting, project(1))
        .await
        .unwrap();

    let evidence = scan.evidence.unwrap();
    let paths: Vec<&str> = evidence.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["z/settings.json", "b/auth.properties"]);
    assert_eq!(evidence.files[1].line_numbers, vec![2]);
}

#[tokio::test]
async fn test_failed_file_is_skipped_and_reported() {
    let hosting = InMemoryHosting::new()
        .with_project(
            InMemoryHosting::project(1, "p1"),
            &[("a/auth.yml", "realm: a\n"), ("b/auth.yml", "realm: b\n")],
        )
        .fail_file(1, "a/auth.yml", 500);

    let scan = ProjectScanner::default()
        .scan_project(&hosting, project(1))
        .await
        .unwrap();

    let evidence = scan.evidence.as_ref().unwrap();
    assert_eq!(evidence.files.len(), 1);
    assert_eq!(evidence.files[0].path, "b/auth.yml");
    assert_eq!(scan.skipped_files.len(), 1);
    assert_eq!(scan.skipped_files[0].0, "a/auth.yml");
    assert!(scan
        .skipped_summary()
        .unwrap()
        .starts_with("could not fetch 'a/auth.yml'"));
}

#[tokio::test]
async fn test_several_failed_files_share_one_summary() {
    let hosting = InMemoryHosting::new()
        .with_project(
            InMemoryHosting::project(1, "p1"),
            &[("a.yml", "x\n"), ("b.yml", "y\n"), ("c.yml", "z\n")],
        )
        .fail_file(1, "a.yml", 404)
        .fail_file(1, "c.yml", 502);

    let scan = ProjectScanner::default()
        .scan_project(&hosting, project(1))
        .await
        .unwrap();

    assert!(scan.evidence.is_none());
    let summary = scan.skipped_summary().unwrap();
    assert!(summary.starts_with("could not fetch 2 files; first 'a.yml'"));
}

#[tokio::test]
async fn test_rejected_credential_on_file_is_fatal() {
    let hosting = InMemoryHosting::new()
        .with_project(
            InMemoryHosting::project(1, "p1"),
            &[("auth.yml", "realm: a\n"), ("sso.yml", "realm: b\n")],
        )
        .fail_file(1, "auth.yml", 401);

    let result = ProjectScanner::default()
        .scan_project(&hosting, project(1))
        .await;

    assert!(matches!(result, Err(HostingError::Auth { status: 401, .. })));
    assert_eq!(hosting.raw_fetch_count(), 1);
}

#[tokio::test]
async fn test_tree_failure_is_returned() {
    let hosting = InMemoryHosting::new()
        .with_project(InMemoryHosting::project(1, "p1"), &[("auth.yml", "realm\n")])
        .fail_tree(1, 404);

    let result = ProjectScanner::default()
        .scan_project(&hosting, project(1))
        .await;

    match result {
        Err(error @ HostingError::TreeFetch { .. }) => assert!(!error.is_fatal()),
        other => panic!("expected tree fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_binary_candidate_yields_no_evidence() {
    let hosting = InMemoryHosting::new()
        .with_project(InMemoryHosting::project(1, "p1"), &[])
        .with_entry(1, FileEntry::blob("keycloak.bin"), Some(b"realm\0\x01\x02".to_vec()))
        .with_entry(1, FileEntry::tree("config"), None);

    let scan = ProjectScanner::default()
        .scan_project(&hosting, project(1))
        .await
        .unwrap();

    assert!(scan.evidence.is_none());
    assert!(scan.skipped_files.is_empty());
    assert_eq!(hosting.raw_fetch_count(), 1);
}

#[tokio::test]
async fn test_custom_selector_and_keywords() {
    let hosting = InMemoryHosting::new().with_project(
        InMemoryHosting::project(1, "p1"),
        &[
            ("cmd/main.go", "const issuer = \"dex-connector\"\n"),
            ("vendor/auth.yml", "realm: x\n"),
        ],
    );

    let scanner = ProjectScanner::new(
        CandidateSelector::new().with_exclusions(vec![glob::Pattern::new("vendor/**").unwrap()]),
        ContentMatcher::new(["dex-connector"]).unwrap(),
    );
    let scan = scanner.scan_project(&hosting, project(1)).await.unwrap();

    let evidence = scan.evidence.unwrap();
    assert_eq!(evidence.files.len(), 1);
    assert_eq!(evidence.files[0].path, "cmd/main.go");
    assert_eq!(evidence.files[0].line_numbers, vec![1]);
}
