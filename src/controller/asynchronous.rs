//! Asynchronous controller.
//!
//! Serves on a multi-threaded runtime; requests are handled concurrently.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::PluginMap;
use crate::controller::state::ControllerCore;
use crate::controller::server;
use crate::controller::types::{ControllerError, ControllerKind, ControllerResult};
use crate::controller::Controller;
use crate::lifecycle::Shutdown;

#[derive(Debug)]
pub struct AsyncController {
    core: ControllerCore,
    worker_threads: Option<usize>,
}

impl AsyncController {
    pub fn new(restore_dir: impl Into<PathBuf>) -> Self {
        Self {
            core: ControllerCore::new(ControllerKind::Async, restore_dir),
            worker_threads: None,
        }
    }

    /// Fix the number of runtime worker threads (defaults to the CPU count).
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads.max(1));
        self
    }

    /// Handle that stops `run` when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.core.shutdown_handle()
    }
}

impl Controller for AsyncController {
    fn kind(&self) -> ControllerKind {
        ControllerKind::Async
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
        let mut builder = tokio::runtime::Builder::new_multi_thread();
        if let Some(threads) = self.worker_threads {
            builder.worker_threads(threads);
        }
        let runtime = builder.enable_all().build().map_err(ControllerError::Runtime)?;

        runtime.block_on(server::serve(self.core.state(), host, self.core.shutdown_handle()))
    }
}
