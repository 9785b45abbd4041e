//! Fleet Scanner
//!
//! Drives enumeration and fans project scans out over a bounded pool of
//! tasks. The coordinating loop is the only writer of the `ScanRun`; project
//! tasks share nothing but the hosting client.

use crate::core::shutdown::ShutdownCoordinator;
use crate::hosting::client::HostingApi;
use crate::hosting::enumerate::{Enumerated, ProjectEnumerator, DEFAULT_PAGE_DELAY};
use crate::hosting::error::{HostingError, HostingResult};
use crate::hosting::types::{Project, ProjectId};
use crate::scanner::error::{ScanAbort, ScanResult};
use crate::scanner::project::{ProjectScan, ProjectScanner};
use crate::scanner::types::{FailureKind, ScanFailure, ScanRun, ScanRunBuilder};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinSet};
use tokio::time::error::Elapsed;

pub const DEFAULT_CONCURRENCY: usize = 4;
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_PROJECT_TIMEOUT: Duration = Duration::from_secs(300);
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct FleetSettings {
    /// Maximum projects scanned at once (at least 1)
    pub concurrency: usize,
    pub page_size: u32,
    /// Ceiling for one project's tree listing plus all of its file fetches
    pub project_timeout: Duration,
    /// How long in-flight projects may continue after cancellation
    pub grace_period: Duration,
    pub page_delay: Duration,
}

impl Default for FleetSettings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            page_size: DEFAULT_PAGE_SIZE,
            project_timeout: DEFAULT_PROJECT_TIMEOUT,
            grace_period: DEFAULT_GRACE_PERIOD,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

type TaskOutput = (Arc<Project>, Result<HostingResult<ProjectScan>, Elapsed>);

/// How the coordinating loop ended
enum Stop {
    Finished,
    Cancelled,
    Fatal(HostingError),
}

pub struct FleetScanner {
    scanner: Arc<ProjectScanner>,
    settings: FleetSettings,
    base_url: String,
    git_ref: String,
}

impl FleetScanner {
    pub fn new(
        scanner: ProjectScanner,
        settings: FleetSettings,
        base_url: impl Into<String>,
        git_ref: impl Into<String>,
    ) -> Self {
        Self {
            scanner: Arc::new(scanner),
            settings,
            base_url: base_url.into(),
            git_ref: git_ref.into(),
        }
    }

    /// Scan every project the credential can see.
    ///
    /// Returns the aggregated run, or the fatal error together with whatever
    /// had been aggregated when it fired.
    pub async fn run(
        &self,
        api: Arc<dyn HostingApi>,
        shutdown: &ShutdownCoordinator,
    ) -> ScanResult<ScanRun> {
        let concurrency = self.settings.concurrency.max(1);
        let mut builder = ScanRun::builder(self.base_url.as_str(), self.git_ref.as_str());
        let mut tasks: JoinSet<TaskOutput> = JoinSet::new();
        let mut in_flight: HashMap<ProjectId, Arc<Project>> = HashMap::new();

        // Enumeration runs at most one project ahead of dispatch
        let (tx, mut projects) = mpsc::channel::<HostingResult<Enumerated>>(1);
        let mut enumerator = ProjectEnumerator::new(api.clone(), self.settings.page_size)
            .with_page_delay(self.settings.page_delay);
        let producer = tokio::spawn(async move {
            loop {
                let next = enumerator.next_project().await;
                let last = !matches!(next, Ok(Enumerated::Project(_)));
                if tx.send(next).await.is_err() || last {
                    break;
                }
            }
        });

        let mut listing_done = false;
        let stop = loop {
            let can_dispatch = !listing_done && tasks.len() < concurrency;
            if !can_dispatch && tasks.is_empty() {
                break Stop::Finished;
            }

            tokio::select! {
                biased;

                _ = shutdown.cancelled() => break Stop::Cancelled,

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(error) = self.record(&mut builder, &mut in_flight, joined) {
                        break Stop::Fatal(error);
                    }
                }

                next = projects.recv(), if can_dispatch => match next {
                    Some(Ok(Enumerated::Project(project))) => {
                        builder.project_discovered();
                        let project = Arc::new(project);
                        in_flight.insert(project.id, project.clone());
                        self.dispatch(&mut tasks, api.clone(), project);
                    }
                    Some(Ok(Enumerated::Truncated(error))) => {
                        builder.add_failure(ScanFailure::enumeration(error.to_string()));
                        listing_done = true;
                    }
                    Some(Ok(Enumerated::Exhausted)) | None => listing_done = true,
                    Some(Err(error)) => break Stop::Fatal(error),
                },
            }
        };

        producer.abort();
        drop(projects);

        match stop {
            Stop::Finished => {
                self.close_in_flight(
                    &mut builder,
                    &mut in_flight,
                    FailureKind::Aborted,
                    "scan task ended abnormally",
                );
                let run = builder.finish();
                log::info!(
                    "Scanned {} of {} projects; {} with evidence, {} errors",
                    run.projects_scanned(),
                    run.projects_total(),
                    run.projects_with_evidence().len(),
                    run.errors().len()
                );
                Ok(run)
            }
            Stop::Cancelled => {
                let fatal = self.drain(&mut builder, &mut in_flight, &mut tasks).await;
                builder.mark_incomplete();
                self.close_in_flight(
                    &mut builder,
                    &mut in_flight,
                    FailureKind::Cancelled,
                    "abandoned after cancellation",
                );
                let run = builder.finish();
                log::warn!(
                    "Run incomplete: scanned {} of {} discovered projects",
                    run.projects_scanned(),
                    run.projects_total()
                );
                match fatal {
                    Some(error) => Err(ScanAbort::new(error, run)),
                    None => Ok(run),
                }
            }
            Stop::Fatal(error) => {
                log::error!("Aborting scan: {}", error);
                tasks.abort_all();
                while tasks.join_next().await.is_some() {}
                self.close_in_flight(
                    &mut builder,
                    &mut in_flight,
                    FailureKind::Aborted,
                    "run aborted",
                );
                Err(ScanAbort::new(error, builder.finish()))
            }
        }
    }

    fn dispatch(
        &self,
        tasks: &mut JoinSet<TaskOutput>,
        api: Arc<dyn HostingApi>,
        project: Arc<Project>,
    ) {
        let scanner = self.scanner.clone();
        let limit = self.settings.project_timeout;
        log::debug!("Dispatching project {}", project.display_name());

        tasks.spawn(async move {
            let scan = scanner.scan_project(api.as_ref(), project.clone());
            let outcome = tokio::time::timeout(limit, scan).await;
            (project, outcome)
        });
    }

    /// Fold one finished task into the run; fatal errors are handed back
    fn record(
        &self,
        builder: &mut ScanRunBuilder,
        in_flight: &mut HashMap<ProjectId, Arc<Project>>,
        joined: Result<TaskOutput, JoinError>,
    ) -> HostingResult<()> {
        let (project, outcome) = match joined {
            Ok(output) => output,
            Err(error) => {
                // The project stays in flight and is closed out at the end
                if error.is_panic() {
                    log::error!("Project scan task panicked");
                }
                return Ok(());
            }
        };
        in_flight.remove(&project.id);

        match outcome {
            Err(_) => {
                log::warn!(
                    "Project {} exceeded {:?}",
                    project.display_name(),
                    self.settings.project_timeout
                );
                builder.add_failure(ScanFailure::for_project(
                    &project,
                    FailureKind::Timeout,
                    format!("exceeded project timeout of {:?}", self.settings.project_timeout),
                ));
            }
            Ok(Err(error)) if error.is_fatal() => return Err(error),
            Ok(Err(error)) => {
                log::warn!("Skipping project {}: {}", project.display_name(), error);
                builder.add_failure(ScanFailure::for_project(
                    &project,
                    FailureKind::Tree,
                    error.to_string(),
                ));
            }
            Ok(Ok(scan)) => {
                builder.project_scanned();
                if let Some(summary) = scan.skipped_summary() {
                    builder.add_failure(ScanFailure::for_project(
                        &project,
                        FailureKind::Files,
                        summary,
                    ));
                }
                if let Some(evidence) = scan.evidence {
                    log::info!(
                        "Evidence in {}: {} files",
                        project.display_name(),
                        evidence.files.len()
                    );
                    builder.add_evidence(evidence);
                }
            }
        }
        Ok(())
    }

    /// Let in-flight scans finish within the grace period, then abort the rest
    async fn drain(
        &self,
        builder: &mut ScanRunBuilder,
        in_flight: &mut HashMap<ProjectId, Arc<Project>>,
        tasks: &mut JoinSet<TaskOutput>,
    ) -> Option<HostingError> {
        if !tasks.is_empty() {
            log::info!(
                "Waiting up to {:?} for {} in-flight projects",
                self.settings.grace_period,
                tasks.len()
            );
        }

        let mut fatal = None;
        let grace = tokio::time::timeout(self.settings.grace_period, async {
            while let Some(joined) = tasks.join_next().await {
                if let Err(error) = self.record(builder, in_flight, joined) {
                    fatal = Some(error);
                    return;
                }
            }
        })
        .await;

        if grace.is_err() || fatal.is_some() {
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}
        }
        fatal
    }

    fn close_in_flight(
        &self,
        builder: &mut ScanRunBuilder,
        in_flight: &mut HashMap<ProjectId, Arc<Project>>,
        kind: FailureKind,
        reason: &str,
    ) {
        let mut remaining: Vec<_> = in_flight.drain().map(|(_, project)| project).collect();
        remaining.sort_by_key(|project| project.id);
        for project in remaining {
            builder.add_failure(ScanFailure::for_project(&project, kind, reason));
        }
    }
}
