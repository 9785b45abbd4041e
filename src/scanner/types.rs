//! Scan data model
//!
//! `ScanRun` owns every record produced by one run. It is assembled by a
//! single writer (`ScanRunBuilder`) and read-only afterwards.

use crate::hosting::types::{Project, ProjectId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Link to a file in the hosting UI: `{web_url}/-/blob/{ref}/{path}`
pub fn blob_url(web_url: &str, git_ref: &str, path: &str) -> String {
    format!("{}/-/blob/{}/{}", web_url.trim_end_matches('/'), git_ref, path)
}

/// One file found to contain keyword matches
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchEvidence {
    pub path: String,
    /// Ascending, 1-based, never empty
    pub line_numbers: Vec<usize>,
}

impl MatchEvidence {
    /// `None` when there are no matching lines
    pub fn new(path: impl Into<String>, line_numbers: Vec<usize>) -> Option<Self> {
        if line_numbers.is_empty() {
            return None;
        }
        Some(Self {
            path: path.into(),
            line_numbers,
        })
    }

    pub fn file_url(&self, web_url: &str, git_ref: &str) -> String {
        blob_url(web_url, git_ref, &self.path)
    }
}

/// Evidence for one project; `files` is never empty
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectEvidence {
    pub project: Arc<Project>,
    /// In candidate-selection order
    pub files: Vec<MatchEvidence>,
}

impl ProjectEvidence {
    /// `None` when no file produced evidence
    pub fn new(project: Arc<Project>, files: Vec<MatchEvidence>) -> Option<Self> {
        if files.is_empty() {
            return None;
        }
        Some(Self { project, files })
    }

    pub fn repository_url(&self) -> &str {
        &self.project.web_url
    }

    pub fn matched_lines(&self) -> usize {
        self.files.iter().map(|f| f.line_numbers.len()).sum()
    }
}

/// What went wrong for a recorded, non-fatal failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureKind {
    /// A later listing page failed; the fleet is incomplete
    Enumeration,
    /// Tree listing failed; the project was skipped
    Tree,
    /// One or more files could not be fetched; the rest were scanned
    Files,
    /// The project exceeded its time budget
    Timeout,
    /// The run was cancelled while the project was in flight
    Cancelled,
    /// The project's scan task ended abnormally
    Aborted,
}

/// One failure that did not abort the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanFailure {
    pub project_id: Option<ProjectId>,
    pub project_name: Option<String>,
    pub kind: FailureKind,
    pub reason: String,
}

impl ScanFailure {
    pub fn for_project(project: &Project, kind: FailureKind, reason: impl Into<String>) -> Self {
        Self {
            project_id: Some(project.id),
            project_name: Some(project.display_name().to_string()),
            kind,
            reason: reason.into(),
        }
    }

    pub fn enumeration(reason: impl Into<String>) -> Self {
        Self {
            project_id: None,
            project_name: None,
            kind: FailureKind::Enumeration,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.project_id, &self.project_name) {
            (Some(id), Some(name)) => {
                write!(f, "[{}] {} ({}): {}", self.kind, name, id, self.reason)
            }
            (Some(id), None) => write!(f, "[{}] project {}: {}", self.kind, id, self.reason),
            _ => write!(f, "[{}] {}", self.kind, self.reason),
        }
    }
}

/// Aggregate of one run
#[derive(Debug, Clone)]
pub struct ScanRun {
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    base_url: String,
    git_ref: String,
    projects_total: usize,
    projects_scanned: usize,
    projects_with_evidence: Vec<ProjectEvidence>,
    errors: Vec<ScanFailure>,
    incomplete: bool,
}

impl ScanRun {
    pub fn builder(base_url: impl Into<String>, git_ref: impl Into<String>) -> ScanRunBuilder {
        ScanRunBuilder::new(base_url, git_ref)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    /// Projects observed from enumeration
    pub fn projects_total(&self) -> usize {
        self.projects_total
    }

    /// Projects whose scan finished (with or without evidence)
    pub fn projects_scanned(&self) -> usize {
        self.projects_scanned
    }

    /// Sorted by project ID
    pub fn projects_with_evidence(&self) -> &[ProjectEvidence] {
        &self.projects_with_evidence
    }

    pub fn errors(&self) -> &[ScanFailure] {
        &self.errors
    }

    /// True when cancellation stopped the run before every project finished
    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    pub fn evidence_file_count(&self) -> usize {
        self.projects_with_evidence.iter().map(|p| p.files.len()).sum()
    }
}

/// Single-writer collector for a `ScanRun`
///
/// Keeps at most one evidence record and one failure per project ID.
#[derive(Debug)]
pub struct ScanRunBuilder {
    started_at: DateTime<Utc>,
    base_url: String,
    git_ref: String,
    projects_total: usize,
    projects_scanned: usize,
    evidence: Vec<ProjectEvidence>,
    evidence_ids: HashSet<ProjectId>,
    errors: Vec<ScanFailure>,
    failed_ids: HashSet<ProjectId>,
    incomplete: bool,
}

impl ScanRunBuilder {
    pub fn new(base_url: impl Into<String>, git_ref: impl Into<String>) -> Self {
        Self {
            started_at: Utc::now(),
            base_url: base_url.into(),
            git_ref: git_ref.into(),
            projects_total: 0,
            projects_scanned: 0,
            evidence: Vec::new(),
            evidence_ids: HashSet::new(),
            errors: Vec::new(),
            failed_ids: HashSet::new(),
            incomplete: false,
        }
    }

    pub fn project_discovered(&mut self) {
        self.projects_total += 1;
    }

    pub fn project_scanned(&mut self) {
        self.projects_scanned += 1;
    }

    /// Returns false if this project already has evidence recorded
    pub fn add_evidence(&mut self, evidence: ProjectEvidence) -> bool {
        if !self.evidence_ids.insert(evidence.project.id) {
            log::warn!(
                "Ignoring duplicate evidence for project {}",
                evidence.project.id
            );
            return false;
        }
        self.evidence.push(evidence);
        true
    }

    /// Returns false if this project already has a failure recorded
    pub fn add_failure(&mut self, failure: ScanFailure) -> bool {
        if let Some(id) = failure.project_id {
            if !self.failed_ids.insert(id) {
                log::debug!("Ignoring second failure for project {}: {}", id, failure.reason);
                return false;
            }
        }
        self.errors.push(failure);
        true
    }

    pub fn mark_incomplete(&mut self) {
        self.incomplete = true;
    }

    pub fn finish(mut self) -> ScanRun {
        self.evidence.sort_by_key(|e| e.project.id);
        ScanRun {
            started_at: self.started_at,
            finished_at: Utc::now(),
            base_url: self.base_url,
            git_ref: self.git_ref,
            projects_total: self.projects_total,
            projects_scanned: self.projects_scanned,
            projects_with_evidence: self.evidence,
            errors: self.errors,
            incomplete: self.incomplete,
        }
    }
}
