//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! argv
//!     → cli.rs (clap: raw options, plugin tokens kept as strings)
//!     → loader.rs (optional TOML file, then command-line overrides)
//!     → plugin_map.rs (NAME:SPEC tokens → PluginMap, duplicates rejected)
//!     → validation.rs (semantic checks)
//!     → RunConfiguration (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is built once per process and never mutated afterwards
//! - All fields have defaults so an empty argument vector is valid
//! - Validation separates syntactic (clap/serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod plugin_map;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{resolve, ConfigError};
pub use plugin_map::{PluginMap, PluginMapError};
pub use schema::{LogConfig, LogFormat, RunConfiguration, Severity};
