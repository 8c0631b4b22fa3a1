//! Lifecycle states, scan stages, and the transition function.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Lifecycle status of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Booked, awaiting assignment.
    Pending,
    /// A driver or carrier has been assigned; collection not yet confirmed.
    Assigned,
    /// Collection confirmed; the shipment is en route.
    InProgress,
    /// Delivery confirmed. Terminal.
    Delivered,
}

impl ShipmentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::Assigned => "assigned",
            ShipmentStatus::InProgress => "in_progress",
            ShipmentStatus::Delivered => "delivered",
        }
    }

    /// True once no further transitions are legal.
    pub fn is_terminal(self) -> bool {
        matches!(self, ShipmentStatus::Delivered)
    }

    /// The scan stage that would advance this status, if any. Both
    /// `Pending` and `Assigned` expect a collection scan — a scan on a
    /// never-assigned shipment implicitly confirms the collecting driver.
    pub fn expected_stage(self) -> Option<ScanStage> {
        match self {
            ShipmentStatus::Pending | ShipmentStatus::Assigned => Some(ScanStage::Collection),
            ShipmentStatus::InProgress => Some(ScanStage::Delivery),
            ShipmentStatus::Delivered => None,
        }
    }

    /// Apply an assignment action.
    ///
    /// Legal from `Pending` and — idempotently — from `Assigned`; a shipment
    /// may be re-assigned any number of times before collection. Illegal once
    /// the shipment is moving or delivered.
    pub fn assign(self) -> Result<ShipmentStatus, LifecycleError> {
        match self {
            ShipmentStatus::Pending | ShipmentStatus::Assigned => Ok(ShipmentStatus::Assigned),
            ShipmentStatus::Delivered => Err(LifecycleError::AlreadyDelivered),
            current => Err(LifecycleError::AssignAfterCollection { current }),
        }
    }

    /// Apply a scan event.
    ///
    /// The stage must be the status's expected next stage; anything else is
    /// rejected without producing a new status, so callers mutate nothing on
    /// the error path.
    pub fn apply_scan(self, stage: ScanStage) -> Result<ShipmentStatus, LifecycleError> {
        if self.is_terminal() {
            return Err(LifecycleError::AlreadyDelivered);
        }
        match self.expected_stage() {
            Some(expected) if expected == stage => Ok(match stage {
                ScanStage::Collection => ShipmentStatus::InProgress,
                ScanStage::Delivery => ShipmentStatus::Delivered,
            }),
            _ => Err(LifecycleError::UnexpectedStage {
                stage,
                current: self,
            }),
        }
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two stages a driver confirms by scanning the waybill code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScanStage {
    Collection,
    Delivery,
}

impl std::fmt::Display for ScanStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanStage::Collection => f.write_str("collection"),
            ScanStage::Delivery => f.write_str("delivery"),
        }
    }
}

/// Illegal lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    /// The scan stage does not match the status's expected next stage.
    #[error("cannot apply {stage} scan while shipment is {current}")]
    UnexpectedStage {
        stage: ScanStage,
        current: ShipmentStatus,
    },

    /// The shipment has reached its terminal state; repeat scans are
    /// rejected so a second proof of delivery is never produced.
    #[error("shipment is already delivered")]
    AlreadyDelivered,

    /// Assignment after the collection scan is meaningless — the shipment
    /// is already moving under a confirmed driver.
    #[error("cannot reassign a shipment that is {current}")]
    AssignAfterCollection { current: ShipmentStatus },
}
