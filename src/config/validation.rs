//! Configuration validation.
//!
//! Serde and clap handle syntax. The checks here are semantic and run on the
//! merged configuration; all problems are collected, not just the first.

use thiserror::Error;

use crate::config::plugin_map::PluginMap;
use crate::config::schema::RunConfiguration;

/// A single semantic problem in the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("host must not be empty")]
    EmptyHost,

    #[error("host '{0}' has no port (expected HOST:PORT)")]
    MissingPort(String),

    #[error("host '{0}' has an invalid port")]
    InvalidPort(String),

    #[error("{registry} entry has an empty name")]
    EmptyPluginName { registry: &'static str },

    #[error("{registry} entry '{name}' has an empty spec")]
    EmptyPluginSpec { registry: &'static str, name: String },
}

/// Validate a merged configuration.
pub fn validate_config(config: &RunConfiguration) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    validate_host(&config.host, &mut errors);
    validate_plugins("resource plugin", &config.resource_plugins, &mut errors);
    validate_plugins("request trigger", &config.request_triggers, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_host(host: &str, errors: &mut Vec<ValidationError>) {
    let host = host.trim();
    if host.is_empty() {
        errors.push(ValidationError::EmptyHost);
        return;
    }

    match host.rsplit_once(':') {
        None => errors.push(ValidationError::MissingPort(host.to_string())),
        Some((_, port)) if port.parse::<u16>().is_err() => {
            errors.push(ValidationError::InvalidPort(host.to_string()))
        }
        Some(_) => {}
    }
}

// Entries from a config file bypass the command-line token parser.
fn validate_plugins(registry: &'static str, plugins: &PluginMap, errors: &mut Vec<ValidationError>) {
    for (name, spec) in plugins.iter() {
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyPluginName { registry });
        } else if spec.trim().is_empty() {
            errors.push(ValidationError::EmptyPluginSpec {
                registry,
                name: name.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RunConfiguration::default()).is_ok());
    }

    #[test]
    fn test_host_forms() {
        for host in ["0.0.0.0:8080", "localhost:50051", "[::1]:9000"] {
            let config = RunConfiguration {
                host: host.into(),
                ..RunConfiguration::default()
            };
            assert!(validate_config(&config).is_ok(), "{host} should be valid");
        }
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RunConfiguration {
            host: "localhost".into(),
            ..RunConfiguration::default()
        };
        config.request_triggers.insert("Initialize", "  ").unwrap();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::MissingPort("localhost".into()),
                ValidationError::EmptyPluginSpec {
                    registry: "request trigger",
                    name: "Initialize".into()
                },
            ]
        );
    }

    #[test]
    fn test_bad_ports() {
        let config = RunConfiguration {
            host: "localhost:http".into(),
            ..RunConfiguration::default()
        };
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::InvalidPort("localhost:http".into())]
        );

        let config = RunConfiguration {
            host: "  ".into(),
            ..RunConfiguration::default()
        };
        assert_eq!(validate_config(&config).unwrap_err(), vec![ValidationError::EmptyHost]);
    }
}
