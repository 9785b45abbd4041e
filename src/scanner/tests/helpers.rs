//! Test helpers for scanner unit tests
//!
//! Separate from the integration helpers in tests/common/ since unit tests
//! and integration tests run in different contexts.

use crate::core::shutdown::ShutdownCoordinator;
use crate::hosting::client::HostingApi;
use crate::hosting::memory::InMemoryHosting;
use crate::scanner::error::ScanResult;
use crate::scanner::fleet::{FleetScanner, FleetSettings};
use crate::scanner::project::ProjectScanner;
use crate::scanner::types::ScanRun;
use std::sync::Arc;
use std::time::Duration;

pub const APP_YML: &str = "server:\n  port: 8080\nrealm: demo\n";

/// Settings with no page delay so tests do not sleep between pages
pub fn fast_settings(concurrency: usize) -> FleetSettings {
    FleetSettings {
        concurrency,
        page_size: 20,
        page_delay: Duration::ZERO,
        ..FleetSettings::default()
    }
}

pub fn fleet_scanner(settings: FleetSettings) -> FleetScanner {
    FleetScanner::new(
        ProjectScanner::default(),
        settings,
        "https://git.example.com",
        "HEAD",
    )
}

/// `count` projects; every third one carries a keycloak config
pub fn mixed_fleet(count: u64) -> InMemoryHosting {
    (1..=count).fold(InMemoryHosting::new(), |hosting, id| {
        let project = InMemoryHosting::project(id, &format!("service-{}", id));
        if id % 3 == 0 {
            hosting.with_project(
                project,
                &[("README.md", "docs"), ("config/keycloak.json", "{\n  \"realm\": \"prod\"\n}\n")],
            )
        } else {
            hosting.with_project(project, &[("src/lib.rs", "pub fn f() {}\n")])
        }
    })
}

pub async fn run_fleet(
    hosting: Arc<InMemoryHosting>,
    settings: FleetSettings,
) -> ScanResult<ScanRun> {
    let api: Arc<dyn HostingApi> = hosting;
    fleet_scanner(settings)
        .run(api, &ShutdownCoordinator::new())
        .await
}

pub fn evidence_ids(run: &ScanRun) -> Vec<u64> {
    run.projects_with_evidence()
        .iter()
        .map(|evidence| evidence.project.id.0)
        .collect()
}
