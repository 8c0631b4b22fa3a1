//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from haz-core, haz-state, and the shipment store to
//! HTTP status codes with JSON bodies. Internal error details are logged,
//! never returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::StoreError;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Unknown shipment reference or resource (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request failed validation: missing required address for the kind,
    /// invalid stage, malformed body (400).
    #[error("validation error: {0}")]
    Validation(String),

    /// Conflict with current state: duplicate reference on creation,
    /// reassignment after collection (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        if let Self::Internal(_) = &self {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Domain validation failures are client errors.
impl From<haz_core::ValidationError> for AppError {
    fn from(err: haz_core::ValidationError) -> Self {
        Self::Validation(err.to_string())
    }
}

/// Store errors map per the API contract: unknown reference → 404,
/// duplicate reference or reassignment-after-collection → 409, and scan
/// stage mismatches (including repeats on a terminal shipment) → 400.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::NotFound(_) => Self::NotFound(err.to_string()),
            StoreError::DuplicateReference(_) => Self::Conflict(err.to_string()),
            StoreError::Lifecycle(lifecycle) => match lifecycle {
                haz_state::LifecycleError::AssignAfterCollection { .. } => {
                    Self::Conflict(err.to_string())
                }
                _ => Self::Validation(err.to_string()),
            },
        }
    }
}
