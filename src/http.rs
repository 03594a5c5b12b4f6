//! HTTP transport for a locker - maps JSON requests to lock/unlock.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `POST /lock` - body `{ "key", "expiresAfter"?, "maxWait"?, "maxAttempts"?, "reuseData"? }`,
//!   replies `{ "state": "locked", "token" }` or `{ "state": "released", "message" }`.
//! - `POST /unlock` - body `{ "key", "token", "message"? }`, replies `{ "state": "unlocked" }`.
//! - `GET /health` - `{ "ok": true }`.
//!
//! Failures reply `{ "error": "..." }` with `LockerError::status_code()`.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use sourced_locker::{http, InMemoryStore, Locker};
//!
//! let locker = Arc::new(Locker::new(InMemoryStore::new()));
//!
//! // Get the router to compose with other axum routes
//! let app = http::router(locker.clone());
//!
//! // Or serve directly
//! http::serve(locker, "0.0.0.0:3000").await?;
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::LockerError;
use crate::lock::{LockRequest, UnlockRequest};
use crate::locker::Locker;
use crate::store::KvStore;

/// Build an axum `Router` serving lock/unlock for the given locker.
pub fn router<S: KvStore + 'static>(locker: Arc<Locker<S>>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/lock", post(lock_handler::<S>))
        .route("/unlock", post(unlock_handler::<S>))
        .with_state(locker)
}

/// Serve the locker over HTTP at the given address (e.g. `"0.0.0.0:3000"`).
pub async fn serve<S: KvStore + 'static>(
    locker: Arc<Locker<S>>,
    addr: &str,
) -> Result<(), std::io::Error> {
    let app = router(locker);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr, "locker listening");
    axum::serve(listener, app).await
}

/// `GET /health`
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

/// `POST /lock`
async fn lock_handler<S: KvStore + 'static>(
    State(locker): State<Arc<Locker<S>>>,
    Json(body): Json<Value>,
) -> Response {
    let result = match LockRequest::from_value(&body) {
        Ok(request) => locker.lock(request).await,
        Err(e) => Err(e),
    };
    respond(result)
}

/// `POST /unlock`
async fn unlock_handler<S: KvStore + 'static>(
    State(locker): State<Arc<Locker<S>>>,
    Json(body): Json<Value>,
) -> Response {
    let result = match UnlockRequest::from_value(&body) {
        Ok(request) => locker.unlock(request).await,
        Err(e) => Err(e),
    };
    respond(result)
}

fn respond<T: Serialize>(result: Result<T, LockerError>) -> Response {
    match result {
        Ok(value) => (StatusCode::OK, Json(value)).into_response(),
        Err(e) => {
            let status =
                StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = json!({ "error": e.to_string() });
            (status, Json(body)).into_response()
        }
    }
}
