//! Control server library.
//!
//! Turns command-line configuration into one running controller, either the
//! synchronous or the asynchronous variant, and keeps it serving until
//! shutdown.

pub mod config;
pub mod controller;
pub mod lifecycle;
pub mod observability;
pub mod plugins;

pub use config::RunConfiguration;
pub use controller::{AsyncController, Controller, ControllerFactory, ControllerKind, SyncController};
pub use lifecycle::{Bootstrap, ExitStatus, Shutdown};
