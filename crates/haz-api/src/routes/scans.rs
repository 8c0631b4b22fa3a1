//! # Scan Confirmation API
//!
//! The driver app posts one event per waybill scan. Stage validation is
//! structural (serde rejects unknown stages) and lifecycle validation runs
//! atomically in the store, so a duplicate or out-of-order scan never has
//! side effects.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use haz_core::{DriverCode, ShipmentRef};
use haz_state::ScanStage;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::orchestration::{self, DeliveryDetails};
use crate::state::AppState;

/// Goods condition as captured by the driver app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScanCondition {
    Good,
    Bad,
}

impl From<ScanCondition> for haz_pod::Condition {
    fn from(c: ScanCondition) -> Self {
        match c {
            ScanCondition::Good => haz_pod::Condition::Good,
            ScanCondition::Bad => haz_pod::Condition::Bad,
        }
    }
}

/// One scan event from the driver app.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ScanRequest {
    pub reference: ShipmentRef,
    pub driver_id: DriverCode,
    pub stage: ScanStage,
    #[serde(default)]
    pub signed_by: Option<String>,
    #[serde(default)]
    pub condition: Option<ScanCondition>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Base64 PNG/JPG of the receiver's signature (delivery stage).
    #[serde(default)]
    pub signature_b64: Option<String>,
}

impl Validate for ScanRequest {
    fn validate(&self) -> Result<(), String> {
        // A 2 MiB body limit already bounds the signature payload; reject
        // obviously oversized notes so PODs stay printable.
        if self.notes.as_ref().is_some_and(|n| n.len() > 2000) {
            return Err("notes must not exceed 2000 characters".to_string());
        }
        Ok(())
    }
}

/// Scan confirmation result.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ScanResponse {
    pub timestamp: DateTime<Utc>,
    /// Path of the generated POD; present for delivery scans only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pod_path: Option<String>,
}

/// Build the scans router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/scans", post(confirm_scan))
}

/// POST /v1/scans — Confirm a collection or delivery scan.
#[utoipa::path(
    post,
    path = "/v1/scans",
    request_body = ScanRequest,
    responses(
        (status = 200, description = "Scan confirmed", body = ScanResponse),
        (status = 400, description = "Invalid stage for current status", body = crate::error::ErrorBody),
        (status = 404, description = "Unknown reference", body = crate::error::ErrorBody),
    ),
    tag = "scans"
)]
pub(crate) async fn confirm_scan(
    State(state): State<AppState>,
    body: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, AppError> {
    let req = extract_validated_json(body)?;
    let reference = req.reference.as_str().to_string();

    let outcome = orchestration::confirm_scan(
        &state,
        &reference,
        Some(req.driver_id),
        req.stage,
        DeliveryDetails {
            signed_by: req.signed_by,
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
