//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! LogConfig (severity, logdir, format)
//!     → logging.rs (filter directives, sinks)
//!     → global tracing subscriber
//!         → console (stderr)
//!         → <logdir>/control-server.log (optional)
//! ```
//!
//! # Design Decisions
//! - One initialize-once entry point; nothing else installs a subscriber
//! - Transport crates (hyper, h2, tower-http, axum) follow the application
//!   severity so their diagnostics honor the same threshold
//! - The bootstrap talks to logging through `LogInitializer` so tests can
//!   substitute a double

pub mod logging;

pub use logging::{init_logging, LogInitError, LogInitializer, TracingLogger};
