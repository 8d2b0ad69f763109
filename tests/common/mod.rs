//! Shared doubles for bootstrap and controller tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use control_server::config::{LogConfig, PluginMap, RunConfiguration};
use control_server::controller::{Controller, ControllerError, ControllerFactory, ControllerKind, ControllerResult};
use control_server::observability::{LogInitError, LogInitializer};
use control_server::plugins::PluginError;

/// One observed interaction with a controller double.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create(ControllerKind),
    SetTimeout(Duration),
    RegisterResourcePlugins(PluginMap),
    RegisterRequestTriggers(PluginMap),
    Restore(String),
    Run(ControllerKind, String),
}

/// Step at which a controller double fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    ResourcePlugins,
    RequestTriggers,
    Restore,
    Run,
    PanicInRun,
}

pub type CallLog = Arc<Mutex<Vec<Call>>>;

pub struct RecordingController {
    kind: ControllerKind,
    calls: CallLog,
    fail_at: Option<FailAt>,
}

impl RecordingController {
    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn fail(&self, step: FailAt) -> ControllerResult<()> {
        if self.fail_at == Some(step) {
            Err(ControllerError::Plugin(PluginError::Unknown(format!("{step:?}"))))
        } else {
            Ok(())
        }
    }
}

impl Controller for RecordingController {
    fn kind(&self) -> ControllerKind {
        self.kind
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.record(Call::SetTimeout(timeout));
    }

    fn register_resource_plugins(&mut self, plugins: &PluginMap) -> ControllerResult<()> {
        self.record(Call::RegisterResourcePlugins(plugins.clone()));
        self.fail(FailAt::ResourcePlugins)
    }

    fn register_request_triggers(&mut self, triggers: &PluginMap) -> ControllerResult<()> {
        self.record(Call::RegisterRequestTriggers(triggers.clone()));
        self.fail(FailAt::RequestTriggers)
    }

    fn restore(&mut self, restore_id: &str) -> ControllerResult<()> {
        self.record(Call::Restore(restore_id.to_string()));
        self.fail(FailAt::Restore)
    }

    // Returns immediately so the bootstrap can finish.
    fn run(&mut self, host: &str) -> ControllerResult<()> {
        self.record(Call::Run(self.kind, host.to_string()));
        if self.fail_at == Some(FailAt::PanicInRun) {
            panic!("controller blew up");
        }
        self.fail(FailAt::Run)
    }
}

#[derive(Clone, Default)]
pub struct RecordingFactory {
    pub calls: CallLog,
    pub fail_at: Option<FailAt>,
}

impl RecordingFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_at(step: FailAt) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn runs(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Run(..))).count()
    }
}

impl ControllerFactory for RecordingFactory {
    fn create(&mut self, kind: ControllerKind, _config: &RunConfiguration) -> ControllerResult<Box<dyn Controller>> {
        self.calls.lock().unwrap().push(Call::Create(kind));
        Ok(Box::new(RecordingController {
            kind,
            calls: self.calls.clone(),
            fail_at: self.fail_at,
        }))
    }
}

/// Logging double counting `init` calls.
#[derive(Clone, Default)]
pub struct FakeLogger {
    pub inits: Arc<AtomicUsize>,
    pub fail: bool,
    pub last_config: Arc<Mutex<Option<LogConfig>>>,
}

impl FakeLogger {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn init_count(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }
}

impl LogInitializer for FakeLogger {
    fn init(&mut self, config: &LogConfig) -> Result<(), LogInitError> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        *self.last_config.lock().unwrap() = Some(config.clone());
        if self.fail {
            Err(LogInitError::OpenFile {
                path: "/nonexistent/control-server.log".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        } else {
            Ok(())
        }
    }
}

/// Build a plugin map from `name:spec` tokens.
pub fn plugins(entries: &[&str]) -> PluginMap {
    PluginMap::parse_entries(entries).unwrap()
}
