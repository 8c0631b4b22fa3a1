//! # Shipment & Driver Identifiers
//!
//! Newtypes for the waybill reference and driver code. The reference is the
//! primary key of a shipment across the whole stack — it is printed on the
//! waybill, encoded in the scan code, and used as the mail-thread subject
//! token — so it is validated once here and treated as opaque everywhere
//! else.
//!
//! ## Validation
//!
//! Both identifiers must be non-empty after trimming. No format is imposed
//! beyond that: references are operator-issued strings (e.g. "HAZJNB0042")
//! and conventions differ per branch.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;

// -- Validating Deserialize for ShipmentRef -----------------------------------

impl<'de> Deserialize<'de> for ShipmentRef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// A waybill reference identifying exactly one shipment.
///
/// # Validation
///
/// Must be a non-empty string after trimming. Leading/trailing whitespace is
/// stripped so a scanned code with stray whitespace still matches the stored
/// reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub struct ShipmentRef(String);

impl ShipmentRef {
    /// Create a shipment reference, validating non-emptiness.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyShipmentRef`] if the string is empty
    /// or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyShipmentRef);
        }
        Ok(Self(trimmed))
    }

    /// Access the reference string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ShipmentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// -- Validating Deserialize for DriverCode ------------------------------------

impl<'de> Deserialize<'de> for DriverCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// An in-house driver's identifier (e.g. "DRIVER001").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
pub struct DriverCode(String);

impl DriverCode {
    /// Create a driver code, validating non-emptiness.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDriverCode`] if the string is empty
    /// or whitespace-only.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyDriverCode);
        }
        Ok(Self(trimmed))
    }

    /// Access the driver code string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for DriverCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
