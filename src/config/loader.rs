//! Configuration loading: optional TOML file, then command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::cli::Cli;
use crate::config::plugin_map::PluginMapError;
use crate::config::schema::RunConfiguration;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Argument vector rejected by the option parser.
    #[error("{0}")]
    Cli(#[from] clap::Error),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid --{option} option: {source}")]
    PluginMap {
        option: &'static str,
        #[source]
        source: PluginMapError,
    },

    #[error("validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load a configuration file. Validation happens after command-line overrides.
pub fn load_config(path: &Path) -> Result<RunConfiguration, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the run configuration from parsed command-line options.
///
/// Precedence is command line, then config file, then defaults. Plugin entries
/// from both sources are merged and must not repeat a name.
pub fn resolve(cli: &Cli) -> Result<RunConfiguration, ConfigError> {
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RunConfiguration::default(),
    };

    if cli.sync {
        config.sync = true;
    }
    if let Some(timeout) = cli.timeout {
        config.timeout_secs = timeout;
    }
    if let Some(host) = &cli.host {
        config.host = host.clone();
    }
    if let Some(severity) = cli.severity {
        config.log.severity = severity;
    }
    if let Some(logdir) = &cli.logdir {
        config.log.logdir = Some(logdir.clone());
    }
    if let Some(format) = cli.log_format {
        config.log.format = format;
    }
    if let Some(restore) = &cli.restore {
        config.restore_id = Some(restore.clone());
    }
    if let Some(dir) = &cli.restore_dir {
        config.restore_dir = dir.clone();
    }

    config
        .resource_plugins
        .merge_entries(&cli.resource_plugins)
        .map_err(|source| ConfigError::PluginMap { option: "rp", source })?;
    config
        .request_triggers
        .merge_entries(&cli.request_triggers)
        .map_err(|source| ConfigError::PluginMap { option: "rt", source })?;

    config.restore_id = config.restore_id.filter(|id| !id.is_empty());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Severity;

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("control-server-loader-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_resolve_defaults() {
        let config = resolve(&Cli::default()).unwrap();
        assert_eq!(config, RunConfiguration::default());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli {
            sync: true,
            timeout: Some(0),
            host: Some("0.0.0.0:8080".into()),
            severity: Some(Severity::Debug),
            resource_plugins: vec!["slurm:/bin/slurm".into()],
            request_triggers: vec!["Shutdown:/bin/notify".into()],
            restore: Some("abc123".into()),
            ..Cli::default()
        };

        let config = resolve(&cli).unwrap();
        assert!(config.sync);
        assert_eq!(config.timeout_secs, 0);
        assert_eq!(config.host, "0.0.0.0:8080");
        assert_eq!(config.log.severity, Severity::Debug);
        assert_eq!(config.resource_plugins.get("slurm"), Some("/bin/slurm"));
        assert_eq!(config.request_triggers.get("Shutdown"), Some("/bin/notify"));
        assert_eq!(config.restore_id(), Some("abc123"));
    }

    #[test]
    fn test_empty_restore_normalized() {
        let cli = Cli {
            restore: Some(String::new()),
            ..Cli::default()
        };
        let config = resolve(&cli).unwrap();
        assert_eq!(config.restore_id, None);
    }

    #[test]
    fn test_duplicate_plugin_is_error() {
        let cli = Cli {
            resource_plugins: vec!["a:/bin/a".into(), "a:/bin/b".into()],
            ..Cli::default()
        };
        let err = resolve(&cli).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::PluginMap {
                option: "rp",
                source: PluginMapError::Duplicate(ref name)
            } if name == "a"
        ));
    }

    #[test]
    fn test_file_then_cli() {
        let path = scratch_file(
            "server.toml",
            r#"
            timeout_secs = 12
            host = "127.0.0.1:7000"

            [resource_plugins]
            slurm = "/bin/slurm"
            "#,
        );

        let cli = Cli {
            config: Some(path.clone()),
            host: Some("127.0.0.1:7001".into()),
            resource_plugins: vec!["ssh:/bin/ssh".into()],
            ..Cli::default()
        };
        let config = resolve(&cli).unwrap();
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.host, "127.0.0.1:7001");
        assert_eq!(config.resource_plugins.len(), 2);

        let cli = Cli {
            config: Some(path),
            resource_plugins: vec!["slurm:/bin/other".into()],
            ..Cli::default()
        };
        assert!(matches!(resolve(&cli), Err(ConfigError::PluginMap { .. })));
    }

    #[test]
    fn test_file_errors() {
        let missing = std::env::temp_dir().join("control-server-missing.toml");
        assert!(matches!(load_config(&missing), Err(ConfigError::Io { .. })));

        let broken = scratch_file("broken.toml", "timeout_secs = \"soon\"");
        assert!(matches!(load_config(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_validation_error_message() {
        let cli = Cli {
            host: Some("localhost".into()),
            ..Cli::default()
        };
        let err = resolve(&cli).unwrap_err();
        assert_eq!(
            err.to_string(),
            "validation failed: host 'localhost' has no port (expected HOST:PORT)"
        );
    }
}
