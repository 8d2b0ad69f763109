//! Request handlers shared by both controller variants.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::controller::state::AppState;
use crate::controller::types::{ControllerError, ControllerKind, Session};
use crate::plugins::PluginError;

/// Request names used to look up request triggers.
pub const INITIALIZE: &str = "Initialize";
pub const SHUTDOWN: &str = "Shutdown";
pub const STATUS: &str = "Status";

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub mode: ControllerKind,
    pub version: String,
    pub timeout_secs: u64,
    pub resource_plugins: Vec<String>,
    pub request_triggers: Vec<String>,
    pub restore_id: Option<String>,
    pub sessions: Vec<Session>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub partition: String,
    /// Resource plugin to run for this session.
    #[serde(default)]
    pub plugin: Option<String>,
    /// Resource description passed to the plugin as `--res`.
    #[serde(default)]
    pub resources: String,
}

/// Errors returned to API callers.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Plugin(PluginError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Plugin(e @ PluginError::Unknown(_)) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Plugin(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let response = StatusResponse {
        mode: state.kind,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timeout_secs: state.timeout.as_secs(),
        resource_plugins: state.resource_plugins.names(),
        request_triggers: state.request_triggers.names(),
        restore_id: state.restore_id().map(str::to_string),
        sessions: state.sessions().list(),
    };

    state.fire_trigger(STATUS, None).await;
    Json(response)
}

pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<Session>> {
    Json(state.sessions().list())
}

pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let partition = request.partition.trim().to_string();
    if partition.is_empty() {
        return Err(ApiError::BadRequest("partition must not be empty".into()));
    }
    // Claimed before the plugin runs so two creates never both allocate.
    let reservation = state.reserve(&partition).map_err(conflict)?;

    let mut session = Session::new(&partition);

    if let Some(plugin) = &request.plugin {
        let args = vec![
            "--res".to_string(),
            request.resources.clone(),
            "--id".to_string(),
            partition.clone(),
        ];
        let resources = state
            .resource_plugins
            .exec(plugin, &args, state.timeout)
            .await
            .map_err(|e| {
                tracing::warn!(partition = %partition, plugin = %plugin, error = %e, "Resource plugin failed");
                ApiError::Plugin(e)
            })?;
        session.resources = Some(resources);
    }

    reservation.commit(session.clone()).map_err(conflict)?;
    state.persist();

    tracing::info!(
        partition = %session.partition,
        session = %session.session,
        "Session created"
    );

    state.fire_trigger(INITIALIZE, Some(&partition)).await;
    Ok((StatusCode::CREATED, Json(session)))
}

fn conflict(error: ControllerError) -> ApiError {
    match error {
        ControllerError::DuplicatePartition(p) => {
            ApiError::Conflict(format!("session for partition '{p}' already exists"))
        }
        other => ApiError::BadRequest(other.to_string()),
    }
}

pub async fn delete_session(
    State(state): State<AppState>,
    Path(partition): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let removed = state.sessions_mut().remove(&partition);
    let session = removed.ok_or_else(|| ApiError::NotFound(format!("no session for partition '{partition}'")))?;
    state.persist();

    tracing::info!(
        partition = %session.partition,
        session = %session.session,
        "Session shut down"
    );

    state.fire_trigger(SHUTDOWN, Some(&partition)).await;
    Ok(Json(session))
}
