//! # haz-api — Dispatch API Service
//!
//! The HTTP surface over the dispatch engine, consumed by the booking form,
//! the ops dashboard, and the driver app.
//!
//! ## API Surface
//!
//! | Prefix              | Module                  | Domain                     |
//! |---------------------|-------------------------|----------------------------|
//! | `/v1/shipments/*`   | [`routes::shipments`]   | Booking, assignment, POD   |
//! | `/v1/scans`         | [`routes::scans`]       | Driver scan confirmations  |
//! | `/v1/ops/*`         | [`routes::dashboard`]   | Dashboard feeds            |
//! | `/v1/drivers/*`     | [`routes::drivers`]     | Driver worklists           |
//! | `/v1/catalog/*`     | [`routes::catalog`]     | Place catalog, geocoding   |
//!
//! ## Flow
//!
//! Handlers validate, then call [`orchestration`]; state transitions commit
//! in the in-memory [`state::ShipmentStore`] under per-entry locks, mirror
//! to Postgres when configured, and emit [`notifications`] events consumed
//! by a background worker — so the mail gateway is never on a request's
//! critical path.

pub mod db;
pub mod error;
pub mod extractors;
pub mod notifications;
pub mod openapi;
pub mod orchestration;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Assemble the full application router.
///
/// Health probes stay outside the traced API router so polling them does
/// not flood the logs.
pub fn app(state: AppState) -> Router {
    // Body limit of 2 MiB leaves room for a base64 signature image while
    // bounding memory per request.
    let api = Router::new()
        .merge(routes::shipments::router())
        .merge(routes::scans::router())
        .merge(routes::dashboard::router())
        .merge(routes::drivers::router())
        .merge(routes::catalog::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let probes = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness))
        .with_state(state);

    Router::new().merge(probes).merge(api)
}

/// Liveness probe — 200 whenever the process runs.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the stores are accessible and, when
/// configured, that the database answers.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    // Stores are lock-based; touching them proves nothing is wedged.
    let _ = state.shipments.len();
    let _ = state.completed.len();

    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
