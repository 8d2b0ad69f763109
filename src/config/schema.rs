//! Configuration schema definitions.
//!
//! This module defines the complete run configuration for the control server.
//! All types derive Serde traits so the same structure can be read from a
//! TOML file and then overlaid with command-line values.

use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::plugin_map::PluginMap;

/// Default endpoint the controller binds to.
pub const DEFAULT_HOST: &str = "localhost:50051";

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Root configuration for one process invocation.
///
/// Built once from the command line (and an optional config file), then
/// consumed read-only by the bootstrap.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RunConfiguration {
    /// Select the synchronous controller instead of the asynchronous one.
    pub sync: bool,

    /// Per-request timeout in seconds. Zero means no timeout is enforced.
    pub timeout_secs: u64,

    /// Endpoint the controller serves on (e.g., "0.0.0.0:8080").
    pub host: String,

    /// Logging settings.
    pub log: LogConfig,

    /// Resource plugins: name → plugin spec.
    pub resource_plugins: PluginMap,

    /// Request triggers: request name → plugin spec.
    pub request_triggers: PluginMap,

    /// Session restore identifier.
    pub restore_id: Option<String>,

    /// Directory holding restore files.
    pub restore_dir: PathBuf,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            sync: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            host: DEFAULT_HOST.to_string(),
            log: LogConfig::default(),
            resource_plugins: PluginMap::new(),
            request_triggers: PluginMap::new(),
            restore_id: None,
            restore_dir: default_restore_dir(),
        }
    }
}

impl RunConfiguration {
    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Restore identifier, if one was supplied and is non-empty.
    pub fn restore_id(&self) -> Option<&str> {
        self.restore_id.as_deref().filter(|id| !id.is_empty())
    }
}

fn default_restore_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".control-server").join("restore"),
        None => PathBuf::from("restore"),
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum severity for application and transport logs.
    pub severity: Severity,

    /// Directory for the log file. Console-only when unset.
    pub logdir: Option<PathBuf>,

    /// Output format.
    pub format: LogFormat,
}

/// Log severity threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Trace,
    Debug,
    #[default]
    Info,
    Warning,
    Error,
    Fatal,
}

impl Severity {
    /// Directive string usable in an `EnvFilter`. `Fatal` has no `tracing`
    /// counterpart and maps to `error`.
    pub fn as_directive(self) -> &'static str {
        match self {
            Severity::Trace => "trace",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warning => "warn",
            Severity::Error | Severity::Fatal => "error",
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}
