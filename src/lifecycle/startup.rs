//! Startup orchestration.
//!
//! # Responsibilities
//! - Parse the argument vector into a `RunConfiguration`
//! - Answer `--help` / `--version` before anything else is touched
//! - Initialize logging, then select, configure and run one controller
//! - Report every failure through a single exit path
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Configuration is applied in a fixed order; `run` is always last
//! - Panics are caught at the boundary and reported as unclassified failures

use std::ffi::OsString;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;

use clap::Parser;
use thiserror::Error;

use crate::config::{self, Cli, ConfigError, RunConfiguration};
use crate::config::cli::VERSION;
use crate::controller::{Controller, ControllerError, ControllerFactory, ControllerKind};
use crate::observability::logging::{LogInitError, LogInitializer, FATAL_TARGET};

/// Message reported for failures that carry no description.
pub const UNEXPECTED_FAILURE: &str = "Unexpected failure occurred.";

/// How a successful bootstrap ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Usage text was printed.
    Help,
    /// Version line was printed.
    Version,
    /// The controller ran and returned control.
    Stopped,
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::SUCCESS,
            ExitStatus::Failure => ExitCode::FAILURE,
        }
    }
}

/// Every way the bootstrap can fail.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Bad arguments, config file, plugin entries or values.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging could not be set up.
    #[error("Can't initialize log: {0}")]
    Logging(#[from] LogInitError),

    /// The controller failed while being configured or while running.
    #[error(transparent)]
    Controller(#[from] ControllerError),

    /// Help or version text could not be written.
    #[error("failed to write output: {0}")]
    Output(#[source] std::io::Error),

    /// A panic escaped the bootstrap.
    #[error("{}", UNEXPECTED_FAILURE)]
    Unclassified,
}

/// Turns an argument vector into one running controller.
pub struct Bootstrap<L, F> {
    logging: L,
    factory: F,
    logging_ready: bool,
}

impl<L: LogInitializer, F: ControllerFactory> Bootstrap<L, F> {
    pub fn new(logging: L, factory: F) -> Self {
        Self {
            logging,
            factory,
            logging_ready: false,
        }
    }

    /// Run the bootstrap and report the outcome.
    ///
    /// Help and version text go to `out`; diagnostics go to `err` and, once
    /// logging is up, to the log as well.
    pub fn execute<I, T>(&mut self, args: I, out: &mut dyn Write, err: &mut dyn Write) -> ExitStatus
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.run(args, out)))
            .unwrap_or(Err(BootstrapError::Unclassified));
        self.report(result, err)
    }

    /// The bootstrap sequence without the failure envelope.
    pub fn run<I, T>(&mut self, args: I, out: &mut dyn Write) -> Result<Exit, BootstrapError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let cli = Cli::try_parse_from(args).map_err(ConfigError::from)?;

        if cli.help {
            write!(out, "{}", Cli::help_text()).map_err(BootstrapError::Output)?;
            return Ok(Exit::Help);
        }
        if cli.version {
            writeln!(out, "{VERSION}").map_err(BootstrapError::Output)?;
            return Ok(Exit::Version);
        }

        let config = config::resolve(&cli)?;

        self.logging.init(&config.log)?;
        self.logging_ready = true;

        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            host = %config.host,
            sync = config.sync,
            timeout_secs = config.timeout_secs,
            "control-server starting"
        );

        dispatch(&mut self.factory, &config)?;

        tracing::info!("Shutdown complete");
        Ok(Exit::Stopped)
    }

    fn report(&self, result: Result<Exit, BootstrapError>, err: &mut dyn Write) -> ExitStatus {
        match result {
            Ok(_) => ExitStatus::Success,
            Err(e) => {
                let message = e.to_string();
                let message = message.trim_end();
                if self.logging_ready {
                    tracing::error!(target: FATAL_TARGET, error = %message, "{message}");
                }
                // Nothing left to report to if stderr itself is gone.
                let _ = writeln!(err, "{message}");
                ExitStatus::Failure
            }
        }
    }
}

/// Create the controller variant selected by `config` and drive it.
pub fn dispatch<F>(factory: &mut F, config: &RunConfiguration) -> Result<(), ControllerError>
where
    F: ControllerFactory + ?Sized,
{
    let kind = ControllerKind::select(config.sync);
    tracing::info!(
        controller = %kind,
        resource_plugins = config.resource_plugins.len(),
        request_triggers = config.request_triggers.len(),
        "Resolved plugin registries"
    );

    let mut controller = factory.create(kind, config)?;
    apply(controller.as_mut(), config)
}

/// Apply `config` to `controller` and run it.
///
/// Order: timeout, resource plugins, request triggers, restore (only with a
/// non-empty id), run. `run` blocks until the controller stops.
pub fn apply(controller: &mut dyn Controller, config: &RunConfiguration) -> Result<(), ControllerError> {
    controller.set_timeout(config.timeout());
    controller.register_resource_plugins(&config.resource_plugins)?;
    controller.register_request_triggers(&config.request_triggers)?;
    if let Some(restore_id) = config.restore_id() {
        controller.restore(restore_id)?;
    }
    controller.run(&config.host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_conversion() {
        assert_eq!(
            format!("{:?}", ExitCode::from(ExitStatus::Success)),
            format!("{:?}", ExitCode::SUCCESS)
        );
        assert_eq!(
            format!("{:?}", ExitCode::from(ExitStatus::Failure)),
            format!("{:?}", ExitCode::FAILURE)
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(BootstrapError::Unclassified.to_string(), UNEXPECTED_FAILURE);

        let err = BootstrapError::from(LogInitError::Filter("bad".into()));
        assert_eq!(err.to_string(), "Can't initialize log: invalid log filter: bad");
    }
}
