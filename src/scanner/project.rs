//! Project Scanner
//!
//! Scans one project: list its tree, select candidate files, fetch each
//! candidate and keep the files whose content matches.

use crate::hosting::client::HostingApi;
use crate::hosting::error::{HostingError, HostingResult};
use crate::hosting::types::Project;
use crate::scanner::matcher::ContentMatcher;
use crate::scanner::select::CandidateSelector;
use crate::scanner::types::{MatchEvidence, ProjectEvidence};
use std::sync::Arc;

/// Outcome of scanning one project
#[derive(Debug, Default)]
pub struct ProjectScan {
    pub evidence: Option<ProjectEvidence>,
    /// Candidates that could not be fetched, as (path, reason)
    pub skipped_files: Vec<(String, String)>,
    pub candidates: usize,
}

impl ProjectScan {
    /// Single-line summary of the skipped files, if any
    pub fn skipped_summary(&self) -> Option<String> {
        match self.skipped_files.as_slice() {
            [] => None,
            [(path, reason)] => Some(format!("could not fetch '{}': {}", path, reason)),
            [(path, reason), rest @ ..] => Some(format!(
                "could not fetch {} files; first '{}': {}",
                rest.len() + 1,
                path,
                reason
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProjectScanner {
    selector: CandidateSelector,
    matcher: ContentMatcher,
}

impl ProjectScanner {
    pub fn new(selector: CandidateSelector, matcher: ContentMatcher) -> Self {
        Self { selector, matcher }
    }

    /// Scan a single project.
    ///
    /// A failed tree listing is returned as an error. A failed file fetch only
    /// skips that file, unless the credential was rejected, which is fatal.
    pub async fn scan_project(
        &self,
        api: &dyn HostingApi,
        project: Arc<Project>,
    ) -> HostingResult<ProjectScan> {
        let entries = api.list_tree(&project).await?;
        let candidates = self.selector.select(&entries);
        log::debug!(
            "Project {} has {} entries, {} candidates",
            project.display_name(),
            entries.len(),
            candidates.len()
        );

        let mut files = Vec::new();
        let mut skipped_files = Vec::new();

        for candidate in &candidates {
            let content = match api.fetch_raw(&project, &candidate.path).await {
                Ok(content) => content,
                Err(error @ HostingError::Auth { .. }) => return Err(error),
                Err(error) => {
                    log::warn!(
                        "Skipping '{}' in {}: {}",
                        candidate.path,
                        project.display_name(),
                        error
                    );
                    skipped_files.push((candidate.path.clone(), error.to_string()));
                    continue;
                }
            };

            match self.matcher.try_match_lines(&content) {
                Ok(lines) => {
                    if let Some(evidence) = MatchEvidence::new(candidate.path.clone(), lines) {
                        files.push(evidence);
                    }
                }
                Err(reason) => log::trace!("Not searching '{}': {}", candidate.path, reason),
            }
        }

        Ok(ProjectScan {
            evidence: ProjectEvidence::new(project, files),
            skipped_files,
            candidates: candidates.len(),
        })
    }
}
