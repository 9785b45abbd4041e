//! Evidence records
//!
//! One record per project with evidence. The three per-file arrays are
//! parallel: index `i` of each refers to the same file.

use crate::scanner::types::ProjectEvidence;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub project_name: String,
    pub repository_url: String,
    pub keycloak_files: Vec<String>,
    pub file_urls: Vec<String>,
    pub line_numbers: Vec<Vec<usize>>,
}

impl ProjectRecord {
    pub fn from_evidence(evidence: &ProjectEvidence, git_ref: &str) -> Self {
        let web_url = evidence.repository_url();
        Self {
            project_name: evidence.project.name.clone(),
            repository_url: web_url.to_string(),
            keycloak_files: evidence.files.iter().map(|f| f.path.clone()).collect(),
            file_urls: evidence
                .files
                .iter()
                .map(|f| f.file_url(web_url, git_ref))
                .collect(),
            line_numbers: evidence
                .files
                .iter()
                .map(|f| f.line_numbers.clone())
                .collect(),
        }
    }

    /// (path, url, lines) triples in file order
    pub fn files(&self) -> impl Iterator<Item = (&str, &str, &[usize])> {
        self.keycloak_files
            .iter()
            .zip(&self.file_urls)
            .zip(&self.line_numbers)
            .map(|((path, url), lines)| (path.as_str(), url.as_str(), lines.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosting::types::{Project, ProjectId};
    use crate::scanner::types::MatchEvidence;
    use std::sync::Arc;

    #[test]
    fn test_record_arrays_are_parallel() {
        let project = Arc::new(Project {
            id: ProjectId(12),
            name: "identity".into(),
            path_with_namespace: Some("platform/identity".into()),
            web_url: "https://git.example.com/platform/identity".into(),
        });
        let evidence = ProjectEvidence::new(
            project,
            vec![
                MatchEvidence::new("config/app.yml", vec![3]).unwrap(),
                MatchEvidence::new(".env", vec![1, 2, 9]).unwrap(),
            ],
        )
        .unwrap();

        let record = ProjectRecord::from_evidence(&evidence, "main");

        assert_eq!(record.project_name, "identity");
        assert_eq!(record.keycloak_files, vec!["config/app.yml", ".env"]);
        assert_eq!(
            record.file_urls,
            vec![
                "https://git.example.com/platform/identity/-/blob/main/config/app.yml",
                "https://git.example.com/platform/identity/-/blob/main/.env",
            ]
        );
        assert_eq!(record.line_numbers, vec![vec![3], vec![1, 2, 9]]);
        assert_eq!(record.files().count(), 2);
    }
}
