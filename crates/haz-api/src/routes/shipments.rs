//! # Shipment API
//!
//! Booking, lookup, assignment, the ops status override, the import
//! collection confirmation, and the operator-triggered POD for third-party
//! carrier deliveries.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use haz_core::{Branch, DriverCode, ShipmentKind, ShipmentRef};
use haz_state::ShipmentStatus;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::orchestration::{self, BookingInput, DeliveryDetails};
use crate::routes::AckResponse;
use crate::state::{AppState, ShipmentRecord};

use super::scans::{ScanCondition, ScanResponse};

/// Booking request from the client-facing form.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateShipmentRequest {
    pub reference: ShipmentRef,
    #[serde(default)]
    pub secondary_ref: Option<String>,
    pub kind: ShipmentKind,
    pub branch: Branch,
    pub company: String,
    pub operator: String,
    #[serde(default)]
    pub pickup_address: Option<String>,
    #[serde(default)]
    pub delivery_address: Option<String>,
    #[serde(default)]
    pub recipients: Vec<String>,
}

impl Validate for CreateShipmentRequest {
    fn validate(&self) -> Result<(), String> {
        if self.company.trim().is_empty() {
            return Err("company must not be empty".to_string());
        }
        if self.operator.trim().is_empty() {
            return Err("operator must not be empty".to_string());
        }
        for email in &self.recipients {
            if !email.contains('@') {
                return Err(format!("recipient {email:?} is not an email address"));
            }
        }
        Ok(())
    }
}

/// Booking response: the reference plus the dispatch decision.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateShipmentResponse {
    pub reference: String,
    /// `"Third-Party"` when the pickup leg is out of driver range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transporter: Option<String>,
}

/// Assignment request: a driver, a carrier, or both.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRequest {
    #[serde(default)]
    pub driver: Option<DriverCode>,
    #[serde(default)]
    pub transporter: Option<String>,
}

impl Validate for AssignRequest {
    fn validate(&self) -> Result<(), String> {
        if self.driver.is_none() && self.transporter.is_none() {
            return Err("assignment requires a driver or a transporter".to_string());
        }
        Ok(())
    }
}

/// Ops status override.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: ShipmentStatus,
    #[serde(default)]
    pub driver: Option<DriverCode>,
}

impl Validate for UpdateStatusRequest {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Operator-triggered POD for a third-party carrier delivery.
#[derive(Debug, Deserialize, ToSchema)]
pub struct OpsPodRequest {
    pub signed_by: String,
    #[serde(default)]
    pub condition: Option<ScanCondition>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub signature_b64: Option<String>,
}

impl Validate for OpsPodRequest {
    fn validate(&self) -> Result<(), String> {
        if self.signed_by.trim().is_empty() {
            return Err("signed_by must not be empty".to_string());
        }
        Ok(())
    }
}

/// Build the shipments router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/shipments", post(create_shipment))
        .route("/v1/shipments/:reference", get(get_shipment))
        .route("/v1/shipments/:reference/assign", post(assign))
        .route("/v1/shipments/:reference/status", post(update_status))
        .route(
            "/v1/shipments/:reference/import-collected",
            post(import_collected),
        )
        .route("/v1/shipments/:reference/pod", post(ops_pod))
}

/// POST /v1/shipments — Book a shipment.
#[utoipa::path(
    post,
    path = "/v1/shipments",
    request_body = CreateShipmentRequest,
    responses(
        (status = 201, description = "Shipment booked", body = CreateShipmentResponse),
        (status = 400, description = "Missing required address for kind", body = crate::error::ErrorBody),
        (status = 409, description = "Reference already exists", body = crate::error::ErrorBody),
    ),
    tag = "shipments"
)]
pub(crate) async fn create_shipment(
    State(state): State<AppState>,
    body: Result<Json<CreateShipmentRequest>, JsonRejection>,
) -> Result<(axum::http::StatusCode, Json<CreateShipmentResponse>), AppError> {
    let req = extract_validated_json(body)?;

    let record = orchestration::book_shipment(
        &state,
        BookingInput {
            reference: req.reference,
            secondary_ref: req.secondary_ref,
            kind: req.kind,
            branch: req.branch,
            company: req.company,
            operator: req.operator,
            pickup_address: req.pickup_address,
            delivery_address: req.delivery_address,
            recipients: req.recipients,
        },
    )
    .await?;

    Ok((
        axum::http::StatusCode::CREATED,
        Json(CreateShipmentResponse {
            reference: record.reference.as_str().to_string(),
            transporter: record.transporter,
        }),
    ))
}

/// GET /v1/shipments/:reference — Fetch one shipment.
#[utoipa::path(
    get,
    path = "/v1/shipments/{reference}",
    params(("reference" = String, Path, description = "Waybill reference")),
    responses(
        (status = 200, description = "Shipment found", body = ShipmentRecord),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "shipments"
)]
pub(crate) async fn get_shipment(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<ShipmentRecord>, AppError> {
    let record = state
        .shipments
        .get(&reference)
        .ok_or_else(|| AppError::NotFound(format!("shipment not found: {reference}")))?;
    Ok(Json(record))
}

/// POST /v1/shipments/:reference/assign — Assign a driver or carrier.
#[utoipa::path(
    post,
    path = "/v1/shipments/{reference}/assign",
    params(("reference" = String, Path, description = "Waybill reference")),
    request_body = AssignRequest,
    responses(
        (status = 200, description = "Assigned", body = AckResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
        (status = 409, description = "Already collected", body = crate::error::ErrorBody),
    ),
    tag = "shipments"
)]
pub(crate) async fn assign(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    body: Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let record = state
        .shipments
        .assign(&reference, req.driver, req.transporter)?;

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::shipments::update_after_mutation(pool, &record).await {
            tracing::warn!(reference, error = %e, "assignment write-through failed");
        }
    }

    Ok(Json(AckResponse { ok: true }))
}

/// POST /v1/shipments/:reference/status — Ops status override.
///
/// Bypasses the lifecycle machine deliberately; this is the escape hatch
/// for correcting operational mistakes.
#[utoipa::path(
    post,
    path = "/v1/shipments/{reference}/status",
    params(("reference" = String, Path, description = "Waybill reference")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status set", body = AckResponse),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "shipments"
)]
pub(crate) async fn update_status(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<AckResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let record = state
        .shipments
        .override_status(&reference, req.status, req.driver)?;
    tracing::info!(reference, status = %record.status, "status override applied");

    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::shipments::update_after_mutation(pool, &record).await {
            tracing::warn!(reference, error = %e, "override write-through failed");
        }
    }

    Ok(Json(AckResponse { ok: true }))
}

/// POST /v1/shipments/:reference/import-collected — Import collection
/// confirmation with the delivery-timing estimate.
#[utoipa::path(
    post,
    path = "/v1/shipments/{reference}/import-collected",
    params(("reference" = String, Path, description = "Waybill reference")),
    responses(
        (status = 200, description = "Notification queued", body = AckResponse),
        (status = 400, description = "Not an import", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "shipments"
)]
pub(crate) async fn import_collected(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<Json<AckResponse>, AppError> {
    orchestration::import_collected(&state, &reference).await?;
    Ok(Json(AckResponse { ok: true }))
}

/// POST /v1/shipments/:reference/pod — Operator-triggered delivery
/// confirmation for third-party carrier shipments.
///
/// Applies the same terminal transition as a delivery scan, so a repeat is
/// rejected the same way.
#[utoipa::path(
    post,
    path = "/v1/shipments/{reference}/pod",
    params(("reference" = String, Path, description = "Waybill reference")),
    request_body = OpsPodRequest,
    responses(
        (status = 200, description = "Delivered; POD generated", body = ScanResponse),
        (status = 400, description = "Invalid stage", body = crate::error::ErrorBody),
        (status = 404, description = "Not found", body = crate::error::ErrorBody),
    ),
    tag = "shipments"
)]
pub(crate) async fn ops_pod(
    State(state): State<AppState>,
    Path(reference): Path<String>,
    body: Result<Json<OpsPodRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let outcome = orchestration::confirm_delivery(
        &state,
        &reference,
        DeliveryDetails {
            signed_by: Some(req.signed_by),
            condition: req.condition.map(Into::into),
            notes: req.notes,
            signature_b64: req.signature_b64,
        },
    )
    .await?;

    Ok(Json(ScanResponse {
        timestamp: outcome.timestamp,
        pod_path: outcome
            .pod_path
            .map(|p| p.to_string_lossy().into_owned()),
    }))
}
