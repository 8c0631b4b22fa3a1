//! # Driver App Feeds
//!
//! The driver app polls two worklists: jobs (assigned + in-progress, shown
//! with the pickup address) and deliveries (in-progress only, shown with
//! the delivery address).

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use haz_state::ShipmentStatus;

use crate::state::{AppState, ShipmentRecord};

/// One row in a driver's worklist.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DriverJob {
    pub reference: String,
    pub company: String,
    /// The address relevant to the list: pickup for jobs, delivery for
    /// deliveries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    pub status: ShipmentStatus,
}

impl DriverJob {
    fn pickup_view(record: &ShipmentRecord) -> Self {
        Self {
            reference: record.reference.as_str().to_string(),
            company: record.company.clone(),
            address: record.route.pickup().map(|s| s.address.clone()),
            status: record.status,
        }
    }

    fn delivery_view(record: &ShipmentRecord) -> Self {
        Self {
            reference: record.reference.as_str().to_string(),
            company: record.company.clone(),
            address: record.route.delivery().map(|s| s.address.clone()),
            status: record.status,
        }
    }
}

/// Build the drivers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/drivers/:code/jobs", get(jobs))
        .route("/v1/drivers/:code/deliveries", get(deliveries))
}

/// GET /v1/drivers/:code/jobs — Assigned and in-progress shipments.
#[utoipa::path(
    get,
    path = "/v1/drivers/{code}/jobs",
    params(("code" = String, Path, description = "Driver code")),
    responses((status = 200, description = "Driver worklist", body = [DriverJob])),
    tag = "drivers"
)]
pub(crate) async fn jobs(State(state): State<AppState>, Path(code): Path<String>) -> Json<Vec<DriverJob>> {
    Json(
        state
            .shipments
            .driver_jobs(&code)
            .iter()
            .map(DriverJob::pickup_view)
            .collect(),
    )
}

/// GET /v1/drivers/:code/deliveries — In-progress shipments only.
#[utoipa::path(
    get,
    path = "/v1/drivers/{code}/deliveries",
    params(("code" = String, Path, description = "Driver code")),
    responses((status = 200, description = "Delivery worklist", body = [DriverJob])),
    tag = "drivers"
)]
pub(crate) async fn deliveries(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Json<Vec<DriverJob>> {
    Json(
        state
            .shipments
            .driver_deliveries(&code)
            .iter()
            .map(DriverJob::delivery_view)
            .collect(),
    )
}
