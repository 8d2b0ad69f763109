//! Plugin error definitions.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while registering or executing plugins.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Plugin name is empty.
    #[error("plugin name must not be empty")]
    EmptyName,

    /// Plugin spec has no executable.
    #[error("plugin '{0}' has an empty spec")]
    EmptySpec(String),

    /// Name already taken in this registry.
    #[error("plugin '{0}' is already registered")]
    AlreadyRegistered(String),

    /// Executable could not be found.
    #[error("plugin '{name}': executable '{program}' doesn't exist")]
    NotFound { name: String, program: String },

    /// No plugin registered under this name.
    #[error("plugin '{0}' is not registered")]
    Unknown(String),

    /// Child process could not be started.
    #[error("failed to start plugin '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Child process exited unsuccessfully.
    #[error("plugin '{name}' failed with exit code {code:?}: {stderr}")]
    Failed {
        name: String,
        code: Option<i32>,
        stderr: String,
    },

    /// Child process did not finish in time.
    #[error("plugin '{name}' timed out after {timeout:?}")]
    Timeout { name: String, timeout: Duration },
}

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;
