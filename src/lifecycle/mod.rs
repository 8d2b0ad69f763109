//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Parse args → help/version? → Resolve config → Init logging
//!         → Select controller → Configure → Run (blocks)
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Stop accepting → Drain in-flight requests → run returns
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging, then the controller
//! - One failure boundary around the whole sequence
//! - Exactly one controller per process

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{apply, dispatch, Bootstrap, BootstrapError, Exit, ExitStatus, UNEXPECTED_FAILURE};
