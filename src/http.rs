//! HTTP transport - maps routes onto the `Alerts` facade.
//!
//! Requires the `http` feature. Uses axum for routing. Store and sink calls
//! are synchronous, so handlers run them on tokio's blocking pool.
//!
//! ## Routes
//!
//! - `POST /subscriptions` — body `{ "model", "email" }`.
//! - `POST /integration/events/device-availability` — body
//!   `{ "deviceModel", "availableCount", "timestamp" }`.
//! - `GET /api/health` — liveness probe.
//!
//! ## Example
//!
//! ```ignore
//! let alerts = Arc::new(Alerts::new(store, dispatcher));
//!
//! // Compose with other axum routes
//! let app = http::router(alerts.clone());
//!
//! // Or serve directly
//! http::serve(alerts, "0.0.0.0:7071").await?;
//! ```

use std::future::Future;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::{TcpListener, ToSocketAddrs};

use crate::app::{Alerts, Reply};
use crate::store::SubscriptionStore;

/// Build an axum `Router` serving the alert endpoints.
pub fn router<S: SubscriptionStore + 'static>(alerts: Arc<Alerts<S>>) -> Router {
    Router::new()
        .route("/subscriptions", post(create_subscription_handler))
        .route(
            "/integration/events/device-availability",
            post(device_availability_handler),
        )
        .route("/api/health", get(health_handler))
        .with_state(alerts)
}

/// Serve the alert endpoints at the given address (e.g. `"0.0.0.0:7071"`).
pub async fn serve<S, A>(alerts: Arc<Alerts<S>>, addr: A) -> Result<(), std::io::Error>
where
    S: SubscriptionStore + 'static,
    A: ToSocketAddrs,
{
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router(alerts)).await
}

/// Serve until `shutdown` resolves, then finish in-flight requests.
pub async fn serve_with_shutdown<S, A, F>(
    alerts: Arc<Alerts<S>>,
    addr: A,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    S: SubscriptionStore + 'static,
    A: ToSocketAddrs,
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(addr).await?;
    if let Ok(local) = listener.local_addr() {
        tracing::info!(addr = %local, "serving availability alerts");
    }
    axum::serve(listener, router(alerts))
        .with_graceful_shutdown(shutdown)
        .await
}

/// `POST /subscriptions`
async fn create_subscription_handler<S: SubscriptionStore + 'static>(
    State(alerts): State<Arc<Alerts<S>>>,
    body: Bytes,
) -> Response {
    match serde_json::from_slice::<Value>(&body) {
        Ok(input) => run_blocking(move || alerts.create_subscription(&input)).await,
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Invalid JSON body" })),
        )
            .into_response(),
    }
}

/// `POST /integration/events/device-availability`
async fn device_availability_handler<S: SubscriptionStore + 'static>(
    State(alerts): State<Arc<Alerts<S>>>,
    body: Bytes,
) -> Response {
    match serde_json::from_slice::<Value>(&body) {
        Ok(input) => run_blocking(move || alerts.device_availability(&input)).await,
        Err(_) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid JSON body" })),
        )
            .into_response(),
    }
}

/// `GET /api/health`
async fn health_handler<S: SubscriptionStore + 'static>(
    State(alerts): State<Arc<Alerts<S>>>,
) -> Response {
    reply(alerts.health())
}

async fn run_blocking<F>(work: F) -> Response
where
    F: FnOnce() -> Reply + Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(outcome) => reply(outcome),
        Err(err) => {
            tracing::error!(error = %err, "alert handler task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "InternalError" })),
            )
                .into_response()
        }
    }
}

fn reply(reply: Reply) -> Response {
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(reply.body)).into_response()
}
