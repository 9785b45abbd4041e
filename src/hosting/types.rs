//! Hosting data types
//!
//! Records returned by the project-listing, tree and raw-content endpoints.
//! Every record is a per-run snapshot; nothing here is persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, stable project identifier assigned by the hosting system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One repository as listed by the enumeration endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    /// Human-readable name, not unique across the fleet
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_with_namespace: Option<String>,
    /// Base URL for links back into the hosting UI
    pub web_url: String,
}

impl Project {
    /// Namespaced path when the host supplied one, plain name otherwise
    pub fn display_name(&self) -> &str {
        self.path_with_namespace.as_deref().unwrap_or(&self.name)
    }
}

/// Tree entry type. Submodule links and anything else unknown map to `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    #[serde(other)]
    Other,
}

/// One path discovered in a project's tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Slash-separated path relative to the repository root
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl FileEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }

    /// Final path segment
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// What the server said about the page after the one just read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPage {
    /// No pagination header; fall back to the short-page rule
    Unknown,
    /// The server signalled there are no more pages
    Done,
    /// The server named the next page number
    Page(u32),
}

impl NextPage {
    /// Interpret an `X-Next-Page` header value (absent, empty or numeric)
    pub fn from_header(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None => NextPage::Unknown,
            Some("") => NextPage::Done,
            Some(number) => number
                .parse::<u32>()
                .map(NextPage::Page)
                .unwrap_or(NextPage::Unknown),
        }
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: NextPage,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next: NextPage) -> Self {
        Self { items, next }
    }

    /// Apply the stop rules: empty page, explicit end, or a short page
    /// when the server gave no pagination header.
    pub fn following(&self, current: u32, page_size: u32) -> Option<u32> {
        if self.items.is_empty() {
            return None;
        }
        match self.next {
            NextPage::Done => None,
            NextPage::Page(next) if next > current => Some(next),
            NextPage::Page(_) => None,
            NextPage::Unknown if self.items.len() < page_size as usize => None,
            NextPage::Unknown => Some(current + 1),
        }
    }
}
