//! The `scan` command
//!
//! Resolves settings, checks the credential, runs the fleet scan and writes
//! the report. A report is written on every path that gets past
//! configuration, including fatal errors, so the output file is always valid.

use super::cli::args::ScanArgs;
use super::cli::settings::{ScanSettings, FALLBACK_TOKEN_ENV};
use super::cli::validation::mask_token;
use crate::core::error_handling::log_error_with_context;
use crate::core::shutdown::ShutdownCoordinator;
use crate::hosting::client::{GitLabClient, HostingApi};
use crate::hosting::error::{HostingError, HostingResult};
use crate::report::EvidenceReport;
use colored::Colorize;
use std::process::ExitCode;
use std::sync::Arc;

/// Process outcome of a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// The run finished, with or without findings or recorded failures
    Completed,
    ReportWrite,
    Config,
    Auth,
    HostingUnavailable,
    Enumeration,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Completed => 0,
            ExitStatus::ReportWrite => 1,
            ExitStatus::Config => 2,
            ExitStatus::Auth => 3,
            ExitStatus::HostingUnavailable => 4,
            ExitStatus::Enumeration => 5,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitStatus::Completed
    }
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status.code())
    }
}

impl From<&HostingError> for ExitStatus {
    fn from(error: &HostingError) -> Self {
        match error {
            HostingError::Auth { .. } => ExitStatus::Auth,
            HostingError::Enumeration { .. } => ExitStatus::Enumeration,
            HostingError::Setup { .. } => ExitStatus::Config,
            HostingError::HostingUnavailable { .. }
            | HostingError::TreeFetch { .. }
            | HostingError::Fetch { .. } => ExitStatus::HostingUnavailable,
        }
    }
}

/// Run the `scan` command against the configured GitLab instance
pub async fn execute(mut args: ScanArgs, config: Option<&toml::Table>) -> ExitStatus {
    if let Some(config) = config {
        if let Err(error) = args.apply_toml_values(config) {
            log_error_with_context(&error, "Configuration");
            return ExitStatus::Config;
        }
    }

    let settings = match args.resolve(std::env::var(FALLBACK_TOKEN_ENV).ok()) {
        Ok(settings) => settings,
        Err(error) => {
            log_error_with_context(&error, "Configuration");
            return ExitStatus::Config;
        }
    };

    log::info!(
        "Scanning {} at ref {} (concurrency {}, token {})",
        settings.base_url,
        settings.git_ref,
        settings.concurrency,
        mask_token(&settings.token)
    );
    log::debug!("Settings: {:?}", settings);

    let client = match GitLabClient::new(settings.gitlab_settings()) {
        Ok(client) => client,
        Err(error) => {
            log_error_with_context(&error, "Hosting client setup");
            return ExitStatus::from(&error);
        }
    };

    let shutdown = ShutdownCoordinator::new();
    shutdown.install_signal_handlers();
    let timer = settings.timeout.map(|limit| shutdown.trigger_after(limit));

    let status = run_scan(Arc::new(client), &settings, &shutdown).await;

    if let Some(timer) = timer {
        timer.abort();
    }
    status
}

/// Credential check, fleet scan and report writing over any hosting backend
pub async fn run_scan(
    api: Arc<dyn HostingApi>,
    settings: &ScanSettings,
    shutdown: &ShutdownCoordinator,
) -> ExitStatus {
    let (report, status) = match preflight(api.as_ref()).await {
        Err(error) => {
            log_error_with_context(&error, "Credential check");
            let report =
                EvidenceReport::empty(settings.base_url.as_str()).with_fatal(error.to_string());
            (report, ExitStatus::from(&error))
        }
        Ok(()) => match settings.fleet_scanner().run(api, shutdown).await {
            Ok(run) => (EvidenceReport::from_run(&run), ExitStatus::Completed),
            Err(abort) => {
                log_error_with_context(&abort, "Fleet scan");
                let status = ExitStatus::from(&abort.error);
                let report =
                    EvidenceReport::from_run(&abort.partial).with_fatal(abort.error.to_string());
                (report, status)
            }
        },
    };

    if let Err(error) = report.write_to(&settings.output, settings.format) {
        log_error_with_context(&error, "Writing report");
        // A fatal scan error outranks the write failure
        return if status.is_success() {
            ExitStatus::ReportWrite
        } else {
            status
        };
    }

    let summary = format!(
        "Found {} files with Keycloak configurations across {} projects",
        report.file_count(),
        report.project_count()
    );
    if status.is_success() && !report.incomplete {
        println!("{} -> {}", summary.green(), settings.output.display());
    } else {
        println!("{} -> {}", summary.yellow(), settings.output.display());
    }
    status
}

async fn preflight(api: &dyn HostingApi) -> HostingResult<()> {
    let user = api.current_user().await?;
    log::info!("Authenticated as {}", user);
    Ok(())
}
