//! Common test utilities and helpers

use authscan::app::cli::args::ScanArgs;
use authscan::app::cli::settings::ScanSettings;
use authscan::hosting::api::{HostingApi, InMemoryHosting};
use std::path::Path;
use std::sync::Arc;

pub const KEYCLOAK_JSON: &str = "{\n  \"realm\": \"prod\",\n  \"auth-server-url\": \"https://sso.example.com/auth\"\n}\n";
pub const APP_YML: &str = "server:\n  port: 8080\nrealm: demo\n";

/// Settings that write `report_name` inside `dir`
pub fn settings_in(dir: &Path, report_name: &str) -> ScanSettings {
    ScanArgs {
        url: Some("https://git.example.com".into()),
        token: Some("glpat-test-token-0000".into()),
        output: Some(dir.join(report_name)),
        ..ScanArgs::default()
    }
    .resolve(None)
    .unwrap()
}

/// Three projects: one with two evidence files, one with none, one with one
pub fn sample_fleet() -> InMemoryHosting {
    InMemoryHosting::new()
        .with_project(
            InMemoryHosting::project(11, "identity"),
            &[
                ("README.md", "realm\n"),
                ("config/app.yml", APP_YML),
                ("keycloak.json", KEYCLOAK_JSON),
            ],
        )
        .with_project(
            InMemoryHosting::project(12, "frontend"),
            &[("package.json", "{\"name\": \"frontend\"}\n")],
        )
        .with_project(
            InMemoryHosting::project(13, "gateway"),
            &[("deploy/values.yaml", "ingress: {}\noidc:\n  enabled: true\n")],
        )
}

pub fn api(hosting: InMemoryHosting) -> Arc<dyn HostingApi> {
    Arc::new(hosting)
}

pub fn read_json(path: &Path) -> serde_json::Value {
    let text = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&text).unwrap()
}
