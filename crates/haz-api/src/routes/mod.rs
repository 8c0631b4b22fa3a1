//! API route modules, one per resource.

pub mod catalog;
pub mod dashboard;
pub mod drivers;
pub mod scans;
pub mod shipments;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::ShipmentRecord;

/// Acknowledgement body for operations whose result is just "it happened".
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AckResponse {
    pub ok: bool,
}

/// Slim shipment view for dashboard feeds.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShipmentSummary {
    pub reference: String,
    pub company: String,
    pub kind: String,
    pub status: haz_state::ShipmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transporter: Option<String>,
}

impl From<&ShipmentRecord> for ShipmentSummary {
    fn from(record: &ShipmentRecord) -> Self {
        Self {
            reference: record.reference.as_str().to_string(),
            company: record.company.clone(),
            kind: record.kind().as_str().to_string(),
            status: record.status,
            pickup_address: record.route.pickup().map(|s| s.address.clone()),
            delivery_address: record.route.delivery().map(|s| s.address.clone()),
            driver: record.driver.as_ref().map(|d| d.as_str().to_string()),
            transporter: record.transporter.clone(),
        }
    }
}
