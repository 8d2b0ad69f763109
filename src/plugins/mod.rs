//! Plugin subsystem.
//!
//! # Data Flow
//! ```text
//! PluginMap (name → "program arg1 arg2")
//!     → manager.rs (resolve executable, register by name)
//!     → exec(name, extra args, timeout) → child process → stdout
//! ```
//!
//! # Design Decisions
//! - Executables are checked at registration so a bad spec fails startup
//! - Resource plugins and request triggers use the same manager type
//! - Execution is async (tokio::process) and bounded by the request timeout

pub mod manager;
pub mod types;

pub use manager::{Plugin, PluginManager};
pub use types::{PluginError, PluginResult};
