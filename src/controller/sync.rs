//! Synchronous controller.
//!
//! Serves on a single-threaded runtime and handles one request at a time.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::PluginMap;
use crate::controller::state::ControllerCore;
use crate::controller::server;
use crate::controller::types::{ControllerError, ControllerKind, ControllerResult};
use crate::controller::Controller;
use crate::lifecycle::Shutdown;

#[derive(Debug)]
pub struct SyncController {
    core: ControllerCore,
}

impl SyncController {
    pub fn new(restore_dir: impl Into<PathBuf>) -> Self {
        Self {
            core: ControllerCore::new(ControllerKind::Sync, restore_dir),
        }
    }

    /// Handle that stops `run` when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.core.shutdown_handle()
    }
}

impl Controller for SyncController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Sync
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.core.set_timeout(timeout);
    }

    fn register_resource_plugins(&mut self, plugins: &PluginMap) -> ControllerResult<()> {
        self.core.register_resource_plugins(plugins)
    }

    fn register_request_triggers(&mut self, triggers: &PluginMap) -> ControllerResult<()> {
        self.core.register_request_triggers(triggers)
    }

    fn restore(&mut self, restore_id: &str) -> ControllerResult<()> {
        self.core.restore(restore_id)
    }

    fn run(&mut self, host: &str) -> ControllerResult<()> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(ControllerError::Runtime)?;

        runtime.block_on(server::serve(self.core.state(), host, self.core.shutdown_handle()))
    }
}
