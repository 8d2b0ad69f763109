//! Controller subsystem.
//!
//! # Data Flow
//! ```text
//! RunConfiguration
//!     → ControllerFactory::create(kind)   (sync or async, chosen once)
//!     → set_timeout
//!     → register_resource_plugins
//!     → register_request_triggers
//!     → restore (only with a non-empty restore id)
//!     → run(host)                          (blocks until shutdown)
//! ```
//!
//! # Design Decisions
//! - Both variants share `ControllerCore` and the same router; they differ
//!   only in runtime flavor and request concurrency
//! - The bootstrap sees controllers only through the `Controller` trait

pub mod asynchronous;
pub mod state;
pub mod handlers;
pub mod restore;
pub mod server;
pub mod sessions;
pub mod sync;
pub mod types;

use std::time::Duration;

use crate::config::{PluginMap, RunConfiguration};

pub use asynchronous::AsyncController;
pub use sync::SyncController;
pub use types::{ControllerError, ControllerKind, ControllerResult, RestoreError, Session};

/// Capability set shared by the synchronous and asynchronous controllers.
pub trait Controller {
    /// Which variant this is.
    fn kind(&self) -> ControllerKind;

    /// Per-request timeout. Zero disables it.
    fn set_timeout(&mut self, timeout: Duration);

    fn register_resource_plugins(&mut self, plugins: &PluginMap) -> ControllerResult<()>;

    fn register_request_triggers(&mut self, triggers: &PluginMap) -> ControllerResult<()>;

    /// Resume the sessions saved under `restore_id`.
    fn restore(&mut self, restore_id: &str) -> ControllerResult<()>;

    /// Serve on `host`. Blocks until the controller is shut down.
    fn run(&mut self, host: &str) -> ControllerResult<()>;
}

/// Constructs the controller variant chosen by the bootstrap.
pub trait ControllerFactory {
    fn create(&mut self, kind: ControllerKind, config: &RunConfiguration) -> ControllerResult<Box<dyn Controller>>;
}

/// Factory producing the real controllers.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultControllerFactory;

impl ControllerFactory for DefaultControllerFactory {
    fn create(&mut self, kind: ControllerKind, config: &RunConfiguration) -> ControllerResult<Box<dyn Controller>> {
        let controller: Box<dyn Controller> = match kind {
            ControllerKind::Sync => Box::new(SyncController::new(&config.restore_dir)),
            ControllerKind::Async => Box::new(AsyncController::new(&config.restore_dir)),
        };
        Ok(controller)
    }
}
