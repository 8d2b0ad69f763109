//! State shared by both controller variants.
//!
//! `ControllerCore` collects configuration while the controller is being set
//! up; `AppState` is the cloneable view handed to request handlers once the
//! controller runs.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use crate::config::PluginMap;
use crate::controller::restore::RestoreFile;
use crate::controller::sessions::SessionTable;
use crate::controller::types::{ControllerKind, ControllerResult, Session};
use crate::lifecycle::Shutdown;
use crate::plugins::PluginManager;

/// Configuration and session state owned by one controller.
#[derive(Debug)]
pub struct ControllerCore {
    kind: ControllerKind,
    timeout: Duration,
    resource_plugins: PluginManager,
    request_triggers: PluginManager,
    sessions: Arc<RwLock<SessionTable>>,
    restore_dir: PathBuf,
    restore: Option<RestoreFile>,
    persist_lock: Arc<Mutex<()>>,
    shutdown: Shutdown,
}

impl ControllerCore {
    pub fn new(kind: ControllerKind, restore_dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            timeout: Duration::ZERO,
            resource_plugins: PluginManager::new(),
            request_triggers: PluginManager::new(),
            sessions: Arc::new(RwLock::new(SessionTable::new())),
            restore_dir: restore_dir.into(),
            restore: None,
            persist_lock: Arc::new(Mutex::new(())),
            shutdown: Shutdown::new(),
        }
    }

    pub fn kind(&self) -> ControllerKind {
        self.kind
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        tracing::info!(controller = %self.kind, timeout_secs = timeout.as_secs(), "Request timeout set");
        self.timeout = timeout;
    }

    pub fn register_resource_plugins(&mut self, plugins: &PluginMap) -> ControllerResult<()> {
        self.resource_plugins.register_all(plugins)?;
        Ok(())
    }

    pub fn register_request_triggers(&mut self, triggers: &PluginMap) -> ControllerResult<()> {
        self.request_triggers.register_all(triggers)?;
        Ok(())
    }

    /// Load the sessions saved under `restore_id` and keep the restore file
    /// up to date from now on. A missing file means there is nothing to restore.
    pub fn restore(&mut self, restore_id: &str) -> ControllerResult<()> {
        let file = RestoreFile::new(&self.restore_dir, restore_id)?;

        match file.read()? {
            Some(data) => {
                let mut sessions = write_sessions(&self.sessions);
                for entry in data.sessions {
                    let session = Session::from(entry);
                    tracing::info!(
                        partition = %session.partition,
                        session = %session.session,
                        "Restoring session"
                    );
                    sessions.insert(session)?;
                }
                tracing::info!(restore_id, restored = sessions.len(), "Restore complete");
            }
            None => {
                tracing::info!(
                    restore_id,
                    path = %file.path().display(),
                    "No restore file found, starting fresh"
                );
            }
        }

        self.restore = Some(file);
        Ok(())
    }

    pub fn resource_plugins(&self) -> &PluginManager {
        &self.resource_plugins
    }

    pub fn request_triggers(&self) -> &PluginManager {
        &self.request_triggers
    }

    /// Handle that stops a running controller when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// Snapshot the configuration into handler state.
    pub fn state(&self) -> AppState {
        AppState {
            kind: self.kind,
            timeout: self.timeout,
            resource_plugins: Arc::new(self.resource_plugins.clone()),
            request_triggers: Arc::new(self.request_triggers.clone()),
            sessions: self.sessions.clone(),
            restore: self.restore.clone().map(Arc::new),
            persist_lock: self.persist_lock.clone(),
        }
    }
}

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub kind: ControllerKind,
    pub timeout: Duration,
    pub resource_plugins: Arc<PluginManager>,
    pub request_triggers: Arc<PluginManager>,
    pub sessions: Arc<RwLock<SessionTable>>,
    pub restore: Option<Arc<RestoreFile>>,
    /// Serializes snapshot + write of the restore file.
    persist_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn sessions(&self) -> RwLockReadGuard<'_, SessionTable> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sessions_mut(&self) -> RwLockWriteGuard<'_, SessionTable> {
        write_sessions(&self.sessions)
    }

    pub fn restore_id(&self) -> Option<&str> {
        self.restore.as_deref().map(RestoreFile::id)
    }

    /// Claim `partition` until the returned guard is committed or dropped.
    pub fn reserve(&self, partition: &str) -> ControllerResult<Reservation<'_>> {
        self.sessions_mut().reserve(partition)?;
        Ok(Reservation {
            state: self,
            partition: partition.to_string(),
            committed: false,
        })
    }

    /// Rewrite the restore file, if one is attached. Failures are logged only.
    ///
    /// The snapshot is taken under the persist lock, so the last writer
    /// always stores a table at least as new as any earlier writer.
    pub fn persist(&self) {
        let Some(file) = &self.restore else {
            return;
        };

        let _guard = self.persist_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let sessions = self.sessions().list();
        if let Err(e) = file.write(&sessions) {
            tracing::error!(error = %e, "Failed to update restore file");
        }
    }

    /// Run the trigger registered for `request`, if any. Failures are logged only.
    pub async fn fire_trigger(&self, request: &str, partition: Option<&str>) {
        if !self.request_triggers.contains(request) {
            return;
        }

        let args: Vec<String> = partition
            .map(|p| vec!["--id".to_string(), p.to_string()])
            .unwrap_or_default();

        match self.request_triggers.exec(request, &args, self.timeout).await {
            Ok(output) => tracing::debug!(trigger = request, %output, "Request trigger finished"),
            Err(e) => tracing::error!(trigger = request, error = %e, "Request trigger failed"),
        }
    }
}

/// A claimed partition. Dropping it without `commit` releases the claim,
/// including when the request future is cancelled.
#[derive(Debug)]
pub struct Reservation<'a> {
    state: &'a AppState,
    partition: String,
    committed: bool,
}

impl Reservation<'_> {
    pub fn partition(&self) -> &str {
        &self.partition
    }

    /// Store `session` in the claimed partition.
    pub fn commit(mut self, session: Session) -> ControllerResult<()> {
        self.committed = true;
        self.state.sessions_mut().insert(session)
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.state.sessions_mut().release(&self.partition);
        }
    }
}

fn write_sessions(sessions: &RwLock<SessionTable>) -> RwLockWriteGuard<'_, SessionTable> {
    sessions.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::restore::RestoreFile;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("control-server-core-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_restore_without_file_starts_fresh() {
        let mut core = ControllerCore::new(ControllerKind::Async, scratch_dir());
        core.restore("abc123").unwrap();

        let state = core.state();
        assert_eq!(state.restore_id(), Some("abc123"));
        assert!(state.sessions().is_empty());
    }

    #[test]
    fn test_restore_loads_sessions() {
        let dir = scratch_dir();
        let saved = vec![Session::new("p1"), Session::new("p2")];
        RestoreFile::new(&dir, "abc123").unwrap().write(&saved).unwrap();

        let mut core = ControllerCore::new(ControllerKind::Sync, &dir);
        core.restore("abc123").unwrap();

        let state = core.state();
        assert_eq!(state.sessions().len(), 2);
        assert_eq!(state.sessions().get("p1").map(|s| s.session), Some(saved[0].session));
    }

    #[test]
    fn test_restore_rejects_bad_id() {
        let mut core = ControllerCore::new(ControllerKind::Async, scratch_dir());
        assert!(core.restore("../etc").is_err());
    }

    #[test]
    fn test_persist_writes_restore_file() {
        let dir = scratch_dir();
        let mut core = ControllerCore::new(ControllerKind::Async, &dir);
        core.restore("run1").unwrap();

        let state = core.state();
        state.sessions_mut().insert(Session::new("p1")).unwrap();
        state.persist();

        let data = RestoreFile::new(&dir, "run1").unwrap().read().unwrap().unwrap();
        assert_eq!(data.sessions.len(), 1);
        assert_eq!(data.sessions[0].partition, "p1");
    }

    #[test]
    fn test_dropped_reservation_frees_partition() {
        let core = ControllerCore::new(ControllerKind::Async, scratch_dir());
        let state = core.state();

        let reservation = state.reserve("p1").unwrap();
        assert_eq!(reservation.partition(), "p1");
        assert!(state.reserve("p1").is_err());
        drop(reservation);

        let reservation = state.reserve("p1").unwrap();
        reservation.commit(Session::new("p1")).unwrap();
        assert!(state.sessions().contains("p1"));
        assert!(state.reserve("p1").is_err());
    }

    #[test]
    fn test_registration() {
        let mut core = ControllerCore::new(ControllerKind::Async, scratch_dir());
        core.set_timeout(Duration::from_secs(30));
        core.register_resource_plugins(&PluginMap::parse_entries(["echo:/bin/echo"]).unwrap())
            .unwrap();
        core.register_request_triggers(&PluginMap::new()).unwrap();

        assert_eq!(core.timeout(), Duration::from_secs(30));
        assert!(core.resource_plugins().contains("echo"));
        assert!(core.request_triggers().is_empty());

        let err = core
            .register_resource_plugins(&PluginMap::parse_entries(["echo:/bin/echo"]).unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
    }
}
