//! # Shipment Kind & Kind-Tagged Route
//!
//! A shipment's kind dictates which stops it must carry: a `local` shipment
//! moves between two client addresses, an `import` only has a delivery leg
//! (goods arrive at the branch), and an `export` only has a pickup leg
//! (goods leave via the branch). [`Route`] is tagged by kind so a shipment
//! with a missing required address cannot be constructed at all.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;
use crate::geo::Coordinates;

/// The kind of shipment, dictating required stops and notification wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShipmentKind {
    Local,
    Import,
    Export,
}

impl ShipmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShipmentKind::Local => "local",
            ShipmentKind::Import => "import",
            ShipmentKind::Export => "export",
        }
    }
}

impl std::str::FromStr for ShipmentKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(ShipmentKind::Local),
            "import" => Ok(ShipmentKind::Import),
            "export" => Ok(ShipmentKind::Export),
            other => Err(ValidationError::UnknownKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for ShipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of a shipment leg: the address as entered plus its resolved
/// coordinate, when geocoding succeeded. An unresolved stop is a valid,
/// low-confidence state — never a reason to reject a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Stop {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Stop {
    /// Create a stop, rejecting an empty address.
    fn new(
        label: &'static str,
        address: impl Into<String>,
        coordinates: Option<Coordinates>,
    ) -> Result<Self, ValidationError> {
        let address = address.into().trim().to_string();
        if address.is_empty() {
            return Err(ValidationError::EmptyAddress(label));
        }
        Ok(Self {
            address,
            coordinates,
        })
    }
}

/// The stops of a shipment, tagged by kind so the per-kind address
/// invariant holds by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Route {
    /// Client-to-client movement within the country.
    Local { pickup: Stop, delivery: Stop },
    /// Goods arriving through the branch; only the delivery leg is ours.
    Import { delivery: Stop },
    /// Goods leaving through the branch; only the pickup leg is ours.
    Export { pickup: Stop },
}

impl Route {
    /// Build a route for `kind` from optional pickup/delivery inputs,
    /// enforcing the kind's required stops.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingStop`] when a required address is absent,
    /// [`ValidationError::EmptyAddress`] when present but blank.
    pub fn for_kind(
        kind: ShipmentKind,
        pickup: Option<(String, Option<Coordinates>)>,
        delivery: Option<(String, Option<Coordinates>)>,
    ) -> Result<Self, ValidationError> {
        let missing = |stop| ValidationError::MissingStop { kind, stop };
        match kind {
            ShipmentKind::Local => {
                let (p_addr, p_coords) = pickup.ok_or_else(|| missing("pickup"))?;
                let (d_addr, d_coords) = delivery.ok_or_else(|| missing("delivery"))?;
                Ok(Route::Local {
                    pickup: Stop::new("pickup", p_addr, p_coords)?,
                    delivery: Stop::new("delivery", d_addr, d_coords)?,
                })
            }
            ShipmentKind::Import => {
                let (d_addr, d_coords) = delivery.ok_or_else(|| missing("delivery"))?;
                Ok(Route::Import {
                    delivery: Stop::new("delivery", d_addr, d_coords)?,
                })
            }
            ShipmentKind::Export => {
                let (p_addr, p_coords) = pickup.ok_or_else(|| missing("pickup"))?;
                Ok(Route::Export {
                    pickup: Stop::new("pickup", p_addr, p_coords)?,
                })
            }
        }
    }

    /// The shipment kind this route was built for.
    pub fn kind(&self) -> ShipmentKind {
        match self {
            Route::Local { .. } => ShipmentKind::Local,
            Route::Import { .. } => ShipmentKind::Import,
            Route::Export { .. } => ShipmentKind::Export,
        }
    }

    /// The pickup stop, if this kind has one.
    pub fn pickup(&self) -> Option<&Stop> {
        match self {
            Route::Local { pickup, .. } | Route::Export { pickup } => Some(pickup),
            Route::Import { .. } => None,
        }
    }

    /// The delivery stop, if this kind has one.
    pub fn delivery(&self) -> Option<&Stop> {
        match self {
            Route::Local { delivery, .. } | Route::Import { delivery } => Some(delivery),
            Route::Export { .. } => None,
        }
    }
}
