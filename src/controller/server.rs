//! HTTP server setup shared by both controller variants.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Enforce the request timeout
//! - Serialize request handling for the synchronous controller
//! - Bind the listener and serve until shutdown

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{delete, get},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::controller::state::AppState;
use crate::controller::handlers;
use crate::controller::types::{ControllerError, ControllerKind, ControllerResult};
use crate::lifecycle::{signals, Shutdown};

/// Build the router for `state`.
pub fn build_router(state: AppState) -> Router {
    let kind = state.kind;
    let timeout = state.timeout;

    let mut router = Router::new()
        .route("/health", get(handlers::health))
        .route("/status", get(handlers::status))
        .route("/sessions", get(handlers::list_sessions).post(handlers::create_session))
        .route("/sessions/{partition}", delete(handlers::delete_session))
        .with_state(state);

    if kind == ControllerKind::Sync {
        let lock = Arc::new(Mutex::new(()));
        router = router.layer(middleware::from_fn_with_state(lock, one_at_a_time));
    }

    if !timeout.is_zero() {
        router = router.layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, timeout));
    }

    router.layer(TraceLayer::new_for_http())
}

/// Hold the request lock for the whole request.
async fn one_at_a_time(State(lock): State<Arc<Mutex<()>>>, request: Request, next: Next) -> Response {
    let _guard = lock.lock().await;
    next.run(request).await
}

/// Bind `host` and serve until `shutdown` fires or a termination signal arrives.
pub async fn serve(state: AppState, host: &str, shutdown: Shutdown) -> ControllerResult<()> {
    let kind = state.kind;
    let router = build_router(state);

    let listener = TcpListener::bind(host).await.map_err(|source| ControllerError::Bind {
        host: host.to_string(),
        source,
    })?;
    let local_addr = listener.local_addr().map_err(ControllerError::Serve)?;

    tracing::info!(
        controller = %kind,
        address = %local_addr,
        "Controller listening"
    );

    tokio::spawn(signals::shutdown_on_signal(shutdown.clone()));

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await
        .map_err(ControllerError::Serve)?;

    tracing::info!(controller = %kind, "Controller stopped");
    Ok(())
}
