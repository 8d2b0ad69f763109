//! Controller types and error definitions.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::plugins::PluginError;

/// The two controller variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerKind {
    /// Requests are handled one at a time.
    Sync,
    /// Requests are handled concurrently.
    Async,
}

impl ControllerKind {
    /// Variant chosen by the `--sync` flag.
    pub fn select(sync: bool) -> Self {
        if sync {
            ControllerKind::Sync
        } else {
            ControllerKind::Async
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ControllerKind::Sync => "sync",
            ControllerKind::Async => "async",
        }
    }
}

impl std::fmt::Display for ControllerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A running session bound to a partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub partition: String,
    pub session: Uuid,
    /// Resource description returned by the resource plugin, if one ran.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<String>,
}

impl Session {
    pub fn new(partition: impl Into<String>) -> Self {
        Self {
            partition: partition.into(),
            session: Uuid::new_v4(),
            resources: None,
        }
    }
}

/// Errors reading or writing restore files.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// Restore IDs become file names and must not contain path separators.
    #[error("invalid restore id '{0}'")]
    InvalidId(String),

    #[error("restore file {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed restore file {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors surfaced by a controller while it is configured or running.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("plugin registration failed: {0}")]
    Plugin(#[from] PluginError),

    #[error("restore failed: {0}")]
    Restore(#[from] RestoreError),

    #[error("session for partition '{0}' already exists")]
    DuplicatePartition(String),

    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("failed to bind {host}: {source}")]
    Bind {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Result type for controller operations.
pub type ControllerResult<T> = Result<T, ControllerError>;
