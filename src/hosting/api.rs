//! Hosting API
//!
//! Public surface of the hosting layer for the scanners and the CLI.

pub use crate::hosting::client::{GitLabClient, GitLabSettings, HostingApi};
pub use crate::hosting::enumerate::{Enumerated, ProjectEnumerator, DEFAULT_PAGE_DELAY};
pub use crate::hosting::error::{HostingError, HostingResult};
pub use crate::hosting::memory::InMemoryHosting;
pub use crate::hosting::types::{EntryKind, FileEntry, Project, ProjectId};
