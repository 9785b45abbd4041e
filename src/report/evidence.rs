//! Evidence Report
//!
//! The reportable view of a `ScanRun`: one record per project with evidence
//! plus the run metadata the HTML page shows.

use super::error::{ReportError, ReportResult};
use super::format::ReportFormat;
use super::formats::get_formatter;
use super::record::ProjectRecord;
use crate::scanner::types::{ScanFailure, ScanRun};
use chrono::{DateTime, Utc};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct EvidenceReport {
    pub generated_at: DateTime<Utc>,
    pub base_url: String,
    pub records: Vec<ProjectRecord>,
    pub projects_total: usize,
    pub projects_scanned: usize,
    pub failures: Vec<ScanFailure>,
    pub incomplete: bool,
    /// Set when a fatal error ended the run
    pub fatal: Option<String>,
}

impl EvidenceReport {
    pub fn from_run(run: &ScanRun) -> Self {
        Self {
            generated_at: Utc::now(),
            base_url: run.base_url().to_string(),
            records: run
                .projects_with_evidence()
                .iter()
                .map(|evidence| ProjectRecord::from_evidence(evidence, run.git_ref()))
                .collect(),
            projects_total: run.projects_total(),
            projects_scanned: run.projects_scanned(),
            failures: run.errors().to_vec(),
            incomplete: run.is_incomplete(),
            fatal: None,
        }
    }

    /// A report with no findings, for runs that produced nothing at all
    pub fn empty(base_url: impl Into<String>) -> Self {
        Self {
            generated_at: Utc::now(),
            base_url: base_url.into(),
            records: Vec::new(),
            projects_total: 0,
            projects_scanned: 0,
            failures: Vec::new(),
            incomplete: false,
            fatal: None,
        }
    }

    pub fn with_fatal(mut self, reason: impl Into<String>) -> Self {
        self.fatal = Some(reason.into());
        self.incomplete = true;
        self
    }

    pub fn file_count(&self) -> usize {
        self.records.iter().map(|r| r.keycloak_files.len()).sum()
    }

    pub fn project_count(&self) -> usize {
        self.records.len()
    }

    pub fn render(&self, format: ReportFormat) -> ReportResult<String> {
        get_formatter(format).format(self)
    }

    /// Render and write the report, creating parent directories as needed
    pub fn write_to(&self, path: &Path, format: ReportFormat) -> ReportResult<()> {
        let content = self.render(format)?;
        let write_error = |source| ReportError::Write {
            path: path.display().to_string(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        std::fs::write(path, content).map_err(write_error)?;

        log::info!(
            "Wrote {} report to {} ({} files across {} projects)",
            format.name(),
            path.display(),
            self.file_count(),
            self.project_count()
        );
        Ok(())
    }
}
