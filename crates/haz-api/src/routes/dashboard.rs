//! # Ops Dashboard Feeds
//!
//! Read-only views the operations dashboard polls: unassigned work,
//! shipments under a driver, and the completed history.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::routes::ShipmentSummary;
use crate::state::{AppState, CompletedRecord};

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/ops/unassigned", get(unassigned))
        .route("/v1/ops/assigned", get(assigned))
        .route("/v1/ops/completed", get(completed))
}

/// GET /v1/ops/unassigned — Pending or assigned shipments with no driver.
#[utoipa::path(
    get,
    path = "/v1/ops/unassigned",
    responses((status = 200, description = "Unassigned shipments", body = [ShipmentSummary])),
    tag = "dashboard"
)]
pub(crate) async fn unassigned(State(state): State<AppState>) -> Json<Vec<ShipmentSummary>> {
    Json(
        state
            .shipments
            .unassigned()
            .iter()
            .map(ShipmentSummary::from)
            .collect(),
    )
}

/// GET /v1/ops/assigned — Shipments with a driver, assigned or moving.
#[utoipa::path(
    get,
    path = "/v1/ops/assigned",
    responses((status = 200, description = "Assigned shipments", body = [ShipmentSummary])),
    tag = "dashboard"
)]
pub(crate) async fn assigned(State(state): State<AppState>) -> Json<Vec<ShipmentSummary>> {
    Json(
        state
            .shipments
            .assigned()
            .iter()
            .map(ShipmentSummary::from)
            .collect(),
    )
}

/// GET /v1/ops/completed — Completed records, newest first.
#[utoipa::path(
    get,
    path = "/v1/ops/completed",
    responses((status = 200, description = "Completed shipments", body = [CompletedRecord])),
    tag = "dashboard"
)]
pub(crate) async fn completed(State(state): State<AppState>) -> Json<Vec<CompletedRecord>> {
    Json(state.completed.list_newest_first())
}
