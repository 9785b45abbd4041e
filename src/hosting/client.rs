//! Hosting Client
//!
//! `HostingApi` is the seam between the scanners and the hosting system.
//! `GitLabClient` implements it against a GitLab-compatible REST surface:
//!
//! - `GET {base}/api/v4/user`
//! - `GET {base}/api/v4/projects?per_page=N&page=P[&membership=true]`
//! - `GET {base}/api/v4/projects/{id}/repository/tree?recursive=true`
//! - `GET {base}/api/v4/projects/{id}/repository/files/{path}/raw?ref=REF`
//!
//! Connection-level failures and 429 responses are retried with exponential
//! backoff; authentication failures are never retried.

use super::error::{HostingError, HostingResult};
use super::types::{FileEntry, NextPage, Page, Project};
use crate::core::retry::{retry_async_when, RetryDecision, RetryPolicy};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Page size used for tree listings; the API maximum
const TREE_PAGE_SIZE: u32 = 100;

/// Read access to a hosting system. Shared by every scan worker.
#[async_trait]
pub trait HostingApi: Send + Sync {
    /// Name of the account the credential belongs to
    async fn current_user(&self) -> HostingResult<String>;

    /// One page of the project listing (pages start at 1)
    async fn list_projects_page(&self, page: u32, per_page: u32) -> HostingResult<Page<Project>>;

    /// Full recursive tree of the project's scanned ref
    async fn list_tree(&self, project: &Project) -> HostingResult<Vec<FileEntry>>;

    /// Raw bytes of one file at the scanned ref
    async fn fetch_raw(&self, project: &Project, path: &str) -> HostingResult<Vec<u8>>;
}

/// Settings for `GitLabClient`
#[derive(Debug, Clone)]
pub struct GitLabSettings {
    pub base_url: String,
    pub token: String,
    pub git_ref: String,
    pub membership_only: bool,
    pub request_timeout: Duration,
    pub retry: RetryPolicy,
    /// Retry statuses outside 2xx/401/403/404/429 before giving up
    pub retry_unknown_status: bool,
}

impl GitLabSettings {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            git_ref: "HEAD".to_string(),
            membership_only: true,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            retry_unknown_status: false,
        }
    }
}

/// Why a single GET did not produce a usable body
#[derive(Debug)]
enum RequestFailure {
    Transport(reqwest::Error),
    Status {
        status: StatusCode,
        retry_after: Option<Duration>,
    },
    Body(String),
}

impl fmt::Display for RequestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestFailure::Transport(e) => write!(f, "network error: {}", e),
            RequestFailure::Status { status, .. } => write!(f, "HTTP {}", status.as_u16()),
            RequestFailure::Body(reason) => write!(f, "malformed response: {}", reason),
        }
    }
}

impl RequestFailure {
    fn status(&self) -> Option<u16> {
        match self {
            RequestFailure::Status { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }

    fn is_auth(&self) -> bool {
        matches!(self, RequestFailure::Status { status, .. } if is_auth_status(*status))
    }
}

fn is_auth_status(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

/// A status the hosting contract does not define
pub fn is_unrecognized_status(status: StatusCode) -> bool {
    !(status.is_success()
        || is_auth_status(status)
        || status == StatusCode::NOT_FOUND
        || status == StatusCode::TOO_MANY_REQUESTS)
}

/// Interpret a numeric `Retry-After` header
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[derive(Deserialize)]
struct CurrentUser {
    username: String,
}

/// GitLab REST client over a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct GitLabClient {
    http: reqwest::Client,
    base_url: Url,
    git_ref: String,
    membership_only: bool,
    retry: RetryPolicy,
    retry_unknown_status: bool,
}

impl GitLabClient {
    pub fn new(settings: GitLabSettings) -> HostingResult<Self> {
        let base_url = Url::parse(settings.base_url.trim_end_matches('/')).map_err(|e| {
            HostingError::Setup {
                message: format!("invalid base URL '{}': {}", settings.base_url, e),
            }
        })?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(HostingError::Setup {
                message: format!("base URL '{}' must be an http(s) URL", settings.base_url),
            });
        }

        let mut token = HeaderValue::from_str(&settings.token).map_err(|_| HostingError::Setup {
            message: "access token contains characters not allowed in an HTTP header".to_string(),
        })?;
        token.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert("PRIVATE-TOKEN", token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout)
            .user_agent(concat!("authscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| HostingError::Setup {
                message: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            http,
            base_url,
            git_ref: settings.git_ref,
            membership_only: settings.membership_only,
            retry: settings.retry,
            retry_unknown_status: settings.retry_unknown_status,
        })
    }

    pub fn git_ref(&self) -> &str {
        &self.git_ref
    }

    /// `{base}/api/v4/{segments...}` with every segment percent-encoded
    fn api_url<'a, I>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v4"]).extend(segments);
        }
        url
    }

    pub fn user_url(&self) -> Url {
        self.api_url(["user"])
    }

    pub fn projects_url(&self, page: u32, per_page: u32) -> Url {
        let mut url = self.api_url(["projects"]);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("per_page", &per_page.to_string())
                .append_pair("page", &page.to_string())
                .append_pair("order_by", "id")
                .append_pair("sort", "asc");
            if self.membership_only {
                query.append_pair("membership", "true");
            }
        }
        url
    }

    pub fn tree_url(&self, project: &Project, page: u32) -> Url {
        let id = project.id.to_string();
        let mut url = self.api_url(["projects", id.as_str(), "repository", "tree"]);
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("recursive", "true")
                .append_pair("per_page", &TREE_PAGE_SIZE.to_string())
                .append_pair("page", &page.to_string());
            // The tree endpoint defaults to the default branch; HEAD is implied
            if self.git_ref != "HEAD" {
                query.append_pair("ref", &self.git_ref);
            }
        }
        url
    }

    /// The file path is a single segment, so '/' is sent as %2F
    pub fn raw_url(&self, project: &Project, path: &str) -> Url {
        let id = project.id.to_string();
        let mut url = self.api_url([
            "projects",
            id.as_str(),
            "repository",
            "files",
            path,
            "raw",
        ]);
        url.query_pairs_mut().append_pair("ref", &self.git_ref);
        url
    }

    fn classify(&self, failure: &RequestFailure) -> RetryDecision {
        match failure {
            RequestFailure::Transport(e) => {
                if e.is_connect() || e.is_timeout() || e.is_request() || e.is_body() {
                    RetryDecision::Backoff
                } else {
                    RetryDecision::Stop
                }
            }
            RequestFailure::Status {
                status,
                retry_after,
            } if *status == StatusCode::TOO_MANY_REQUESTS => match retry_after {
                Some(wait) => RetryDecision::After(*wait),
                None => RetryDecision::Backoff,
            },
            RequestFailure::Status { status, .. }
                if self.retry_unknown_status && is_unrecognized_status(*status) =>
            {
                RetryDecision::Backoff
            }
            _ => RetryDecision::Stop,
        }
    }

    /// GET with retry; yields the successful response only
    async fn get(&self, operation: &str, url: &Url) -> Result<reqwest::Response, RequestFailure> {
        retry_async_when(
            operation,
            self.retry.clone(),
            || async {
                let response = self
                    .http
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(RequestFailure::Transport)?;
                let status = response.status();
                if status.is_success() {
                    Ok::<_, RequestFailure>(response)
                } else {
                    Err(RequestFailure::Status {
                        status,
                        retry_after: parse_retry_after(response.headers()),
                    })
                }
            },
            |failure| self.classify(failure),
        )
        .await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: &Url,
    ) -> Result<(T, NextPage), RequestFailure> {
        let response = self.get(operation, url).await?;
        let next = NextPage::from_header(
            response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok()),
        );
        let body = response.bytes().await.map_err(RequestFailure::Transport)?;
        let parsed =
            serde_json::from_slice(&body).map_err(|e| RequestFailure::Body(e.to_string()))?;
        Ok((parsed, next))
    }
}

#[async_trait]
impl HostingApi for GitLabClient {
    async fn current_user(&self) -> HostingResult<String> {
        let url = self.user_url();
        match self.get_json::<CurrentUser>("current_user", &url).await {
            Ok((user, _)) => Ok(user.username),
            Err(failure) if failure.is_auth() => Err(HostingError::Auth {
                status: failure.status().unwrap_or(401),
                url: url.to_string(),
            }),
            Err(failure) => Err(HostingError::HostingUnavailable {
                url: url.to_string(),
                status: failure.status(),
                reason: failure.to_string(),
            }),
        }
    }

    async fn list_projects_page(&self, page: u32, per_page: u32) -> HostingResult<Page<Project>> {
        let url = self.projects_url(page, per_page);
        log::debug!("Listing projects page {} ({} per page)", page, per_page);

        match self.get_json::<Vec<Project>>("list_projects", &url).await {
            Ok((projects, next)) => Ok(Page::new(projects, next)),
            Err(failure) => Err(enumeration_error(failure, page, &url)),
        }
    }

    async fn list_tree(&self, project: &Project) -> HostingResult<Vec<FileEntry>> {
        let mut entries = Vec::new();
        let mut page = 1;

        loop {
            let url = self.tree_url(project, page);
            let (items, next) = self
                .get_json::<Vec<FileEntry>>("list_tree", &url)
                .await
                .map_err(|failure| match failure {
                    f if f.is_auth() => HostingError::Auth {
                        status: f.status().unwrap_or(401),
                        url: url.to_string(),
                    },
                    f => HostingError::TreeFetch {
                        project_id: project.id,
                        status: f.status(),
                        reason: f.to_string(),
                    },
                })?;

            let listing = Page::new(items, next);
            let following = listing.following(page, TREE_PAGE_SIZE);
            entries.extend(listing.items);
            match following {
                Some(next_page) => page = next_page,
                None => break,
            }
        }

        log::trace!("Project {} tree has {} entries", project.id, entries.len());
        Ok(entries)
    }

    async fn fetch_raw(&self, project: &Project, path: &str) -> HostingResult<Vec<u8>> {
        let url = self.raw_url(project, path);
        let fetched = async {
            let response = self.get("fetch_raw", &url).await?;
            response.bytes().await.map_err(RequestFailure::Transport)
        };

        match fetched.await {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(f) if f.is_auth() => Err(HostingError::Auth {
                status: f.status().unwrap_or(401),
                url: url.to_string(),
            }),
            Err(f) => Err(HostingError::Fetch {
                project_id: project.id,
                path: path.to_string(),
                status: f.status(),
                reason: f.to_string(),
            }),
        }
    }
}

/// Map a listing failure onto the enumeration error taxonomy. Transport
/// failures stay page-scoped; the enumerator decides whether they are fatal.
fn enumeration_error(failure: RequestFailure, page: u32, url: &Url) -> HostingError {
    match &failure {
        RequestFailure::Status { status, .. } if is_auth_status(*status) => HostingError::Auth {
            status: status.as_u16(),
            url: url.to_string(),
        },
        RequestFailure::Status { status, .. } if is_unrecognized_status(*status) => {
            HostingError::HostingUnavailable {
                url: url.to_string(),
                status: Some(status.as_u16()),
                reason: failure.to_string(),
            }
        }
        _ => HostingError::Enumeration {
            page,
            reason: failure.to_string(),
        },
    }
}
