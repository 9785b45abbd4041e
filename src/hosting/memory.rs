//! In-memory hosting backend
//!
//! A `HostingApi` over fixed data with injectable failures and latencies.
//! Used to exercise the scanners without a live hosting system.

use super::client::{is_unrecognized_status, HostingApi};
use super::error::{HostingError, HostingResult};
use super::types::{FileEntry, NextPage, Page, Project, ProjectId};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

const MEMORY_URL: &str = "memory://hosting";

/// Test and demo backend; never talks to a real hosting system.
#[derive(Default)]
pub struct InMemoryHosting {
    username: String,
    projects: Vec<Project>,
    trees: HashMap<ProjectId, Vec<FileEntry>>,
    files: HashMap<(ProjectId, String), Vec<u8>>,
    user_status: Option<u16>,
    listing_failures: HashMap<u32, u16>,
    listing_disconnects: HashSet<u32>,
    tree_failures: HashMap<ProjectId, u16>,
    file_failures: HashMap<(ProjectId, String), u16>,
    tree_delays: HashMap<ProjectId, Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    raw_fetches: AtomicUsize,
}

impl InMemoryHosting {
    pub fn new() -> Self {
        Self {
            username: "scanner".to_string(),
            ..Self::default()
        }
    }

    /// Project record with a web URL under `https://git.example.com`
    pub fn project(id: u64, name: &str) -> Project {
        Project {
            id: ProjectId(id),
            name: name.to_string(),
            path_with_namespace: Some(format!("group/{}", name)),
            web_url: format!("https://git.example.com/group/{}", name),
        }
    }

    /// Add a project whose tree holds exactly the given blobs, in order
    pub fn with_project(mut self, project: Project, files: &[(&str, &str)]) -> Self {
        let id = project.id;
        let tree = self.trees.entry(id).or_default();
        for (path, content) in files {
            tree.push(FileEntry::blob(*path));
            self.files
                .insert((id, path.to_string()), content.as_bytes().to_vec());
        }
        self.projects.push(project);
        self
    }

    /// Add a raw tree entry (directories, binary blobs) to an existing project
    pub fn with_entry(mut self, id: u64, entry: FileEntry, content: Option<Vec<u8>>) -> Self {
        let id = ProjectId(id);
        if let Some(bytes) = content {
            self.files.insert((id, entry.path.clone()), bytes);
        }
        self.trees.entry(id).or_default().push(entry);
        self
    }

    pub fn with_user_status(mut self, status: u16) -> Self {
        self.user_status = Some(status);
        self
    }

    pub fn fail_listing_page(mut self, page: u32, status: u16) -> Self {
        self.listing_failures.insert(page, status);
        self
    }

    /// Fail the listing page as a dropped connection would, after retries
    pub fn disconnect_listing_page(mut self, page: u32) -> Self {
        self.listing_disconnects.insert(page);
        self
    }

    pub fn fail_tree(mut self, id: u64, status: u16) -> Self {
        self.tree_failures.insert(ProjectId(id), status);
        self
    }

    pub fn fail_file(mut self, id: u64, path: &str, status: u16) -> Self {
        self.file_failures
            .insert((ProjectId(id), path.to_string()), status);
        self
    }

    /// Make the project's tree listing take `delay`
    pub fn delay_tree(mut self, id: u64, delay: Duration) -> Self {
        self.tree_delays.insert(ProjectId(id), delay);
        self
    }

    /// Highest number of tree listings observed running at once
    pub fn max_concurrent_scans(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn raw_fetch_count(&self) -> usize {
        self.raw_fetches.load(Ordering::SeqCst)
    }
}

fn is_auth(status: u16) -> bool {
    status == 401 || status == 403
}

fn unrecognized(status: u16) -> bool {
    StatusCode::from_u16(status)
        .map(is_unrecognized_status)
        .unwrap_or(true)
}

/// Decrements the in-flight counter however the listing future ends
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HostingApi for InMemoryHosting {
    async fn current_user(&self) -> HostingResult<String> {
        match self.user_status {
            Some(status) if is_auth(status) => Err(HostingError::Auth {
                status,
                url: format!("{}/user", MEMORY_URL),
            }),
            Some(status) if !(200..300).contains(&status) => Err(HostingError::HostingUnavailable {
                url: format!("{}/user", MEMORY_URL),
                status: Some(status),
                reason: format!("HTTP {}", status),
            }),
            _ => Ok(self.username.clone()),
        }
    }

    async fn list_projects_page(&self, page: u32, per_page: u32) -> HostingResult<Page<Project>> {
        let url = format!("{}/projects?page={}", MEMORY_URL, page);
        if self.listing_disconnects.contains(&page) {
            return Err(HostingError::Enumeration {
                page,
                reason: "network error: connection refused".to_string(),
            });
        }
        if let Some(&status) = self.listing_failures.get(&page) {
            return Err(if is_auth(status) {
                HostingError::Auth { status, url }
            } else if unrecognized(status) {
                HostingError::HostingUnavailable {
                    url,
                    status: Some(status),
                    reason: format!("HTTP {}", status),
                }
            } else {
                HostingError::Enumeration {
                    page,
                    reason: format!("HTTP {}", status),
                }
            });
        }

        let per_page = per_page.max(1) as usize;
        let start = (page.max(1) as usize - 1) * per_page;
        let items = self
            .projects
            .iter()
            .skip(start)
            .take(per_page)
            .cloned()
            .collect();
        Ok(Page::new(items, NextPage::Unknown))
    }

    async fn list_tree(&self, project: &Project) -> HostingResult<Vec<FileEntry>> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.tree_delays.get(&project.id) {
            tokio::time::sleep(*delay).await;
        }

        match self.tree_failures.get(&project.id) {
            Some(&status) if is_auth(status) => Err(HostingError::Auth {
                status,
                url: format!("{}/projects/{}/repository/tree", MEMORY_URL, project.id),
            }),
            Some(&status) => Err(HostingError::TreeFetch {
                project_id: project.id,
                status: Some(status),
                reason: format!("HTTP {}", status),
            }),
            None => Ok(self.trees.get(&project.id).cloned().unwrap_or_default()),
        }
    }

    async fn fetch_raw(&self, project: &Project, path: &str) -> HostingResult<Vec<u8>> {
        self.raw_fetches.fetch_add(1, Ordering::SeqCst);
        let key = (project.id, path.to_string());

        match self.file_failures.get(&key) {
            Some(&status) if is_auth(status) => Err(HostingError::Auth {
                status,
                url: format!("{}/projects/{}/files/{}", MEMORY_URL, project.id, path),
            }),
            Some(&status) => Err(HostingError::Fetch {
                project_id: project.id,
                path: path.to_string(),
                status: Some(status),
                reason: format!("HTTP {}", status),
            }),
            None => self.files.get(&key).cloned().ok_or(HostingError::Fetch {
                project_id: project.id,
                path: path.to_string(),
                status: Some(404),
                reason: "HTTP 404".to_string(),
            }),
        }
    }
}
