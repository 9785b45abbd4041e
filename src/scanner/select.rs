//! Candidate File Selector
//!
//! Decides from a path alone whether a file is worth fetching. A blob is a
//! candidate when any rule matches:
//!
//! - (a) its extension is configuration-like, or a source extension commonly
//!   used to embed configuration constants
//! - (b) its file name contains a naming hint (`config`, `auth`, `sso`, ...)
//! - (c) it is a well-known configuration file without such an extension
//!   (`Dockerfile`, `.env`, `docker-compose.*`, ...)
//!
//! False positives are cheap (content matching filters them); false
//! negatives are not, so the rules only ever widen the selection. Exclusion
//! globs are applied last.

use crate::hosting::types::FileEntry;
use std::collections::HashSet;

pub const CONFIG_EXTENSIONS: &[&str] = &[
    "yml",
    "yaml",
    "json",
    "properties",
    "env",
    "conf",
    "config",
    "xml",
];

pub const SOURCE_EXTENSIONS: &[&str] = &[
    "js", "ts", "java", "py", "go", "rb", "php", "c", "cpp", "h", "hpp", "sh",
];

pub const NAME_HINTS: &[&str] = &[
    "config",
    "application",
    "settings",
    "auth",
    "security",
    "keycloak",
    "oauth",
    "sso",
];

/// Exact file names (lowercase) selected regardless of extension
pub const WELL_KNOWN_FILES: &[&str] = &[
    "dockerfile",
    ".env",
    "requirements.txt",
    "build.gradle",
    "pom.xml",
    "package.json",
];

/// File name prefixes (lowercase) selected regardless of extension
pub const WELL_KNOWN_PREFIXES: &[&str] = &["docker-compose", ".env."];

#[derive(Debug, Clone)]
pub struct CandidateSelector {
    include_source: bool,
    exclude: Vec<glob::Pattern>,
}

impl Default for CandidateSelector {
    fn default() -> Self {
        Self {
            include_source: true,
            exclude: Vec::new(),
        }
    }
}

impl CandidateSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict rule (a) to configuration extensions only
    pub fn config_only(mut self) -> Self {
        self.include_source = false;
        self
    }

    /// Drop candidates whose path matches any of these patterns
    pub fn with_exclusions(mut self, patterns: Vec<glob::Pattern>) -> Self {
        self.exclude = patterns;
        self
    }

    /// Blob entries worth fetching, in input order, each path at most once
    pub fn select(&self, entries: &[FileEntry]) -> Vec<FileEntry> {
        let mut seen = HashSet::new();
        entries
            .iter()
            .filter(|entry| entry.is_blob())
            .filter(|entry| self.is_candidate(&entry.path))
            .filter(|entry| seen.insert(entry.path.as_str()))
            .cloned()
            .collect()
    }

    /// Path-only decision for a blob
    pub fn is_candidate(&self, path: &str) -> bool {
        let name = path.rsplit('/').next().unwrap_or(path).to_ascii_lowercase();
        if name.is_empty() || self.is_excluded(path) {
            return false;
        }

        self.has_allowed_extension(&name) || has_name_hint(&name) || is_well_known(&name)
    }

    fn is_excluded(&self, path: &str) -> bool {
        let options = glob::MatchOptions {
            case_sensitive: true,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        self.exclude
            .iter()
            .any(|pattern| pattern.matches_with(path, options))
    }

    fn has_allowed_extension(&self, name: &str) -> bool {
        // A leading dot marks a hidden file, not an extension
        let Some((stem, extension)) = name.rsplit_once('.') else {
            return false;
        };
        if stem.is_empty() {
            return false;
        }
        CONFIG_EXTENSIONS.contains(&extension)
            || (self.include_source && SOURCE_EXTENSIONS.contains(&extension))
    }
}

fn has_name_hint(name: &str) -> bool {
    NAME_HINTS.iter().any(|hint| name.contains(hint))
}

fn is_well_known(name: &str) -> bool {
    WELL_KNOWN_FILES.contains(&name)
        || WELL_KNOWN_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
}
