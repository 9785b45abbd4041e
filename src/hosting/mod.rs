//! Hosting Client
//!
//! Thin, retrying access to the hosting system's project-listing, tree and
//! raw-content endpoints, plus lazy project enumeration on top of it.

pub mod api;
pub mod client;
pub mod enumerate;
pub mod error;
pub mod memory;
pub mod types;

pub use client::{GitLabClient, GitLabSettings, HostingApi};
pub use enumerate::{Enumerated, ProjectEnumerator};
pub use error::{HostingError, HostingResult};
pub use types::{EntryKind, FileEntry, NextPage, Page, Project, ProjectId};
