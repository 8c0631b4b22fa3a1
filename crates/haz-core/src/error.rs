//! Validation errors for domain primitive construction.

use thiserror::Error;

/// Errors raised when a domain value fails construction-time validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Shipment reference is empty or whitespace-only.
    #[error("shipment reference must not be empty")]
    EmptyShipmentRef,

    /// Driver code is empty or whitespace-only.
    #[error("driver code must not be empty")]
    EmptyDriverCode,

    /// Unknown branch code.
    #[error("unknown branch code: {0}")]
    UnknownBranch(String),

    /// Unknown shipment kind.
    #[error("unknown shipment kind: {0}")]
    UnknownKind(String),

    /// A stop address required by the shipment kind is missing.
    #[error("{kind} shipment requires a {stop} address")]
    MissingStop {
        /// Shipment kind that imposed the requirement.
        kind: crate::shipment::ShipmentKind,
        /// Which stop was missing ("pickup" or "delivery").
        stop: &'static str,
    },

    /// A stop address is present but empty.
    #[error("{0} address must not be empty")]
    EmptyAddress(&'static str),
}
