//! Application startup
//!
//! Parses the command line, loads the configuration file, installs logging
//! and dispatches the subcommand on a multi-threaded runtime.

use super::cli::args::{Cli, Command};
use super::cli::config::load_config_file;
use super::scan::{self, ExitStatus};
use crate::core::logging::{flush_logging, init_logging};
use clap::Parser;
use std::process::ExitCode;

pub fn startup() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("authscan: failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let status = runtime.block_on(run(cli));
    flush_logging();
    status.into()
}

async fn run(mut cli: Cli) -> ExitStatus {
    // Logging is not installed yet, so configuration problems go to stderr
    let config = match load_config_file(cli.global.config_file.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("authscan: {}", e);
            return ExitStatus::Config;
        }
    };
    if let Some(config) = &config {
        if let Err(e) = cli.global.apply_toml_values(config) {
            eprintln!("authscan: {}", e);
            return ExitStatus::Config;
        }
    }

    let use_color = cli.global.use_color();
    colored::control::set_override(use_color);

    let log_file = cli
        .global
        .log_file
        .as_ref()
        .map(|path| path.to_string_lossy().into_owned());
    if let Err(e) = init_logging(
        cli.global.log_level.as_deref(),
        cli.global.log_format.as_deref(),
        log_file.as_deref(),
        use_color,
    ) {
        eprintln!("authscan: failed to initialise logging: {}", e);
        return ExitStatus::Config;
    }
    log::debug!("authscan {} starting", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Scan(args) => scan::execute(args, config.as_ref()).await,
    }
}
