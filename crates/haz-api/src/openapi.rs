//! OpenAPI 3 document, generated from the utoipa annotations on the route
//! handlers and served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// The API document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Haz Dispatch API",
        description = "Hazardous-materials shipment dispatch and lifecycle engine."
    ),
    paths(
        crate::routes::shipments::create_shipment,
        crate::routes::shipments::get_shipment,
        crate::routes::shipments::assign,
        crate::routes::shipments::update_status,
        crate::routes::shipments::import_collected,
        crate::routes::shipments::ops_pod,
        crate::routes::scans::confirm_scan,
        crate::routes::dashboard::unassigned,
        crate::routes::dashboard::assigned,
        crate::routes::dashboard::completed,
        crate::routes::drivers::jobs,
        crate::routes::drivers::deliveries,
        crate::routes::catalog::regions,
        crate::routes::catalog::areas,
        crate::routes::catalog::places,
        crate::routes::catalog::resolve,
    ),
    components(schemas(
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        crate::routes::AckResponse,
        crate::routes::ShipmentSummary,
        crate::routes::shipments::CreateShipmentRequest,
        crate::routes::shipments::CreateShipmentResponse,
        crate::routes::shipments::AssignRequest,
        crate::routes::shipments::UpdateStatusRequest,
        crate::routes::shipments::OpsPodRequest,
        crate::routes::scans::ScanRequest,
        crate::routes::scans::ScanResponse,
        crate::routes::scans::ScanCondition,
        crate::routes::drivers::DriverJob,
        crate::routes::catalog::RegionsResponse,
        crate::routes::catalog::AreasResponse,
        crate::routes::catalog::PlacesResponse,
        crate::routes::catalog::PlaceInfo,
        crate::routes::catalog::ResolveRequest,
        crate::routes::catalog::ResolveResponse,
        crate::state::ShipmentRecord,
        crate::state::CompletedRecord,
        haz_core::Branch,
        haz_core::ShipmentKind,
        haz_core::ShipmentRef,
        haz_core::DriverCode,
        haz_core::Coordinates,
        haz_core::Route,
        haz_core::Stop,
        haz_state::ShipmentStatus,
        haz_state::ScanStage,
    )),
    tags(
        (name = "shipments", description = "Booking, assignment, lifecycle operations"),
        (name = "scans", description = "Driver scan confirmations"),
        (name = "dashboard", description = "Ops dashboard feeds"),
        (name = "drivers", description = "Driver app feeds"),
        (name = "catalog", description = "Place catalog and address resolution"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve))
}

async fn serve() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
