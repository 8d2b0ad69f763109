//! Plugin registry and execution.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::config::PluginMap;
use crate::plugins::types::{PluginError, PluginResult};

/// A resolved plugin: executable plus fixed leading arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plugin {
    pub name: String,
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl Plugin {
    /// Parse a whitespace separated spec. The first token is the executable,
    /// which must exist (directly, or on `PATH` for bare names).
    pub fn parse(name: &str, spec: &str) -> PluginResult<Self> {
        let mut tokens = spec.split_whitespace();
        let program = tokens.next().ok_or_else(|| PluginError::EmptySpec(name.to_string()))?;

        let program = resolve_program(program).ok_or_else(|| PluginError::NotFound {
            name: name.to_string(),
            program: program.to_string(),
        })?;

        Ok(Self {
            name: name.to_string(),
            program,
            args: tokens.map(str::to_string).collect(),
        })
    }
}

fn resolve_program(program: &str) -> Option<PathBuf> {
    let path = Path::new(program);
    if path.components().count() > 1 || path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }

    let search = std::env::var_os("PATH")?;
    std::env::split_paths(&search)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

/// Named plugins of one kind (resource plugins or request triggers).
#[derive(Debug, Clone, Default)]
pub struct PluginManager {
    plugins: BTreeMap<String, Plugin>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one plugin. Names must be unique.
    pub fn register(&mut self, name: &str, spec: &str) -> PluginResult<()> {
        if name.trim().is_empty() {
            return Err(PluginError::EmptyName);
        }
        if self.plugins.contains_key(name) {
            return Err(PluginError::AlreadyRegistered(name.to_string()));
        }

        let plugin = Plugin::parse(name, spec)?;
        tracing::info!(
            plugin = %name,
            program = %plugin.program.display(),
            "Plugin registered"
        );
        self.plugins.insert(name.to_string(), plugin);
        Ok(())
    }

    /// Register every entry of `map`, stopping at the first failure.
    pub fn register_all(&mut self, map: &PluginMap) -> PluginResult<()> {
        for (name, spec) in map.iter() {
            self.register(name, spec)?;
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run plugin `name` with `extra_args` appended and return its trimmed stdout.
    ///
    /// A zero `timeout` waits indefinitely.
    pub async fn exec(&self, name: &str, extra_args: &[String], timeout: Duration) -> PluginResult<String> {
        let plugin = self
            .plugins
            .get(name)
            .ok_or_else(|| PluginError::Unknown(name.to_string()))?;

        tracing::debug!(
            plugin = %name,
            program = %plugin.program.display(),
            args = ?extra_args,
            "Executing plugin"
        );

        let mut command = Command::new(&plugin.program);
        command
            .args(&plugin.args)
            .args(extra_args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = if timeout.is_zero() {
            command.output().await
        } else {
            tokio::time::timeout(timeout, command.output())
                .await
                .map_err(|_| PluginError::Timeout {
                    name: name.to_string(),
                    timeout,
                })?
        }
        .map_err(|source| PluginError::Spawn {
            name: name.to_string(),
            source,
        })?;

        if !output.status.success() {
            return Err(PluginError::Failed {
                name: name.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
