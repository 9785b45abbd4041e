//! Project enumeration
//!
//! Walks the paginated project listing lazily, one page at a time. The first
//! page must succeed; a later page that fails truncates the listing but keeps
//! everything already yielded. Fatal errors (auth, unavailable endpoint) stop
//! enumeration on any page.

use super::client::HostingApi;
use super::error::{HostingError, HostingResult};
use super::types::Project;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// Pause between listing pages
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(100);

/// Result of asking for the next project
#[derive(Debug)]
pub enum Enumerated {
    Project(Project),
    /// A later page failed; no more projects will follow
    Truncated(HostingError),
    Exhausted,
}

/// Lazy, finite sequence of projects over a `HostingApi`
pub struct ProjectEnumerator {
    api: Arc<dyn HostingApi>,
    page_size: u32,
    page_delay: Duration,
    next_page: Option<u32>,
    pages_read: u32,
    observed: usize,
    buffer: VecDeque<Project>,
}

impl ProjectEnumerator {
    pub fn new(api: Arc<dyn HostingApi>, page_size: u32) -> Self {
        Self {
            api,
            page_size: page_size.max(1),
            page_delay: DEFAULT_PAGE_DELAY,
            next_page: Some(1),
            pages_read: 0,
            observed: 0,
            buffer: VecDeque::new(),
        }
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Number of projects yielded so far
    pub fn observed(&self) -> usize {
        self.observed
    }

    pub async fn next_project(&mut self) -> HostingResult<Enumerated> {
        loop {
            if let Some(project) = self.buffer.pop_front() {
                self.observed += 1;
                return Ok(Enumerated::Project(project));
            }

            let Some(page) = self.next_page else {
                return Ok(Enumerated::Exhausted);
            };

            if self.pages_read > 0 && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            match self.api.list_projects_page(page, self.page_size).await {
                Ok(listing) => {
                    self.pages_read += 1;
                    self.next_page = listing.following(page, self.page_size);
                    log::debug!(
                        "Project listing page {} returned {} projects",
                        page,
                        listing.items.len()
                    );
                    self.buffer.extend(listing.items);
                }
                Err(error) if self.pages_read == 0 || error.is_fatal() => {
                    self.next_page = None;
                    return Err(error);
                }
                Err(error) => {
                    self.next_page = None;
                    log::warn!(
                        "Project listing truncated after {} projects: {}",
                        self.observed,
                        error
                    );
                    return Ok(Enumerated::Truncated(error));
                }
            }
        }
    }

    /// Drain the whole listing. Returns the projects plus the truncation
    /// error, if the listing was cut short.
    pub async fn collect(mut self) -> HostingResult<(Vec<Project>, Option<HostingError>)> {
        let mut projects = Vec::new();
        loop {
            match self.next_project().await? {
                Enumerated::Project(project) => projects.push(project),
                Enumerated::Truncated(error) => return Ok((projects, Some(error))),
                Enumerated::Exhausted => return Ok((projects, None)),
            }
        }
    }
}
