//! Command-line option schema.
//!
//! Clap's built-in `--help`/`--version` handling is disabled: both are plain
//! flags here so they are only acted on after the full argument vector has
//! parsed successfully.

use std::path::PathBuf;

use clap::{CommandFactory, Parser};

use crate::config::schema::{LogFormat, Severity};

/// Version line printed for `--version`.
pub const VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " ", env!("CARGO_PKG_VERSION"));

#[derive(Parser, Debug, Default, Clone, PartialEq)]
#[command(
    name = "control-server",
    about = "Control server exposing session management over a sync or async controller",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Print help and exit
    #[arg(short, long)]
    pub help: bool,

    /// Print version and exit
    #[arg(short, long)]
    pub version: bool,

    /// Use the synchronous controller
    #[arg(long)]
    pub sync: bool,

    /// Request timeout in seconds (0 disables it)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Endpoint to serve on
    #[arg(long, value_name = "HOST:PORT")]
    pub host: Option<String>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log severity
    #[arg(long, value_enum)]
    pub severity: Option<Severity>,

    /// Log directory
    #[arg(long, value_name = "DIR")]
    pub logdir: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Register resource plugins (name1:spec1 name2:spec2)
    #[arg(long = "rp", value_name = "NAME:SPEC", num_args = 1..)]
    pub resource_plugins: Vec<String>,

    /// Register request triggers (name1:spec1 name2:spec2)
    #[arg(long = "rt", value_name = "NAME:SPEC", num_args = 1..)]
    pub request_triggers: Vec<String>,

    /// Restore sessions saved under this ID
    #[arg(long, value_name = "ID")]
    pub restore: Option<String>,

    /// Directory holding restore files
    #[arg(long, value_name = "DIR")]
    pub restore_dir: Option<PathBuf>,
}

impl Cli {
    /// Rendered usage text.
    pub fn help_text() -> String {
        Self::command().render_help().to_string()
    }
}
