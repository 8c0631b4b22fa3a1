//! Request validation plumbing shared by all route modules.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Request-body validation beyond what serde enforces structurally.
pub trait Validate {
    /// Return `Err` with a client-facing message when the body is invalid.
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap an extracted JSON body, turning rejections and validation
/// failures into [`AppError::Validation`] (400).
pub fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) = body.map_err(|e| AppError::Validation(format!("invalid request body: {e}")))?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}
