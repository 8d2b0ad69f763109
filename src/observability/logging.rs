//! Structured logging.
//!
//! # Responsibilities
//! - Install the process-wide `tracing` subscriber exactly once
//! - Console output on stderr, optional log file in a configured directory
//! - Apply the configured severity to the transport crates as well
//!
//! # Design Decisions
//! - Unrelated third-party targets stay at `warn`
//! - Failure is reported to the caller; the subscriber is only installed
//!   once every sink has been opened

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogFormat, Severity};

/// Name of the log file created inside the log directory.
pub const LOG_FILE_NAME: &str = "control-server.log";

/// Target used for the fatal diagnostic channel.
pub const FATAL_TARGET: &str = "fatal";

/// Targets belonging to the HTTP transport stack.
pub const TRANSPORT_TARGETS: &[&str] = &["hyper", "h2", "tower_http", "axum"];

const APP_TARGETS: &[&str] = &["control_server", FATAL_TARGET];

/// Errors that can occur while initializing logging.
#[derive(Debug, Error)]
pub enum LogInitError {
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open log file {path}: {source}")]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Entry point used by the bootstrap to apply the log configuration.
pub trait LogInitializer {
    fn init(&mut self, config: &LogConfig) -> Result<(), LogInitError>;
}

/// Initializer backed by the global `tracing` subscriber.
#[derive(Debug, Default)]
pub struct TracingLogger;

impl LogInitializer for TracingLogger {
    fn init(&mut self, config: &LogConfig) -> Result<(), LogInitError> {
        init_logging(config)
    }
}

/// Install the global subscriber for `config`.
pub fn init_logging(config: &LogConfig) -> Result<(), LogInitError> {
    let filter = build_filter(config.severity)?;
    let file = config.logdir.as_deref().map(open_log_file).transpose()?.map(Arc::new);

    let registry = tracing_subscriber::registry().with(filter);

    let result = match config.format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(file.map(|file| fmt::layer().with_ansi(false).with_writer(file)))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(file.map(|file| fmt::layer().json().with_writer(file)))
            .try_init(),
    };

    result.map_err(|e| LogInitError::AlreadyInitialized(e.to_string()))
}

/// Filter directives for `severity`.
///
/// The application and the transport crates share the same threshold;
/// everything else is held at `warn`.
pub fn filter_directives(severity: Severity) -> String {
    let level = severity.as_directive();
    let mut directives = vec!["warn".to_string()];
    directives.extend(APP_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.extend(transport_directives(severity));
    directives.join(",")
}

/// Transport verbosity for `severity`.
pub fn transport_directives(severity: Severity) -> Vec<String> {
    let level = severity.as_directive();
    TRANSPORT_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect()
}

fn build_filter(severity: Severity) -> Result<EnvFilter, LogInitError> {
    EnvFilter::try_new(filter_directives(severity)).map_err(|e| LogInitError::Filter(e.to_string()))
}

/// Create `dir` if needed and open the log file in append mode.
pub fn open_log_file(dir: &Path) -> Result<File, LogInitError> {
    fs::create_dir_all(dir).map_err(|source| LogInitError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(LOG_FILE_NAME);
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| LogInitError::OpenFile { path, source })
}
