//! # Dispatch Decision
//!
//! Two geography-driven judgments made at booking time:
//!
//! - **Driver vs. carrier** ([`transporter_for`]): for kinds with a local
//!   pickup leg, classify hub → pickup. A remote leg marks the shipment for
//!   a third-party carrier; an unresolved pickup defaults to driver-eligible
//!   so a geocoding failure never blocks a booking.
//! - **Import delivery timing** ([`DeliveryEta`]): imports have no pickup
//!   leg; the hub → delivery classification instead feeds the wording of the
//!   "collected at the airport" client notification.
//!
//! Both are advisory metadata. Assigning a concrete driver or carrier stays
//! an explicit operator action.

use chrono::Timelike;

use haz_core::{Branch, Coordinates, Leg, ShipmentKind};

/// Transporter marker stored on a shipment that needs a third-party carrier.
pub const THIRD_PARTY: &str = "Third-Party";

/// Imports collected at the airport before this hour are promised same-day
/// delivery when the drop is within driver range.
const SAME_DAY_CUTOFF_HOUR: u32 = 13;

/// Decide whether the shipment needs a third-party carrier.
///
/// Returns `Some(THIRD_PARTY)` when the branch-hub → pickup leg is remote;
/// `None` when the shipment stays in the in-house driver pool. Imports never
/// get a transporter here — they have no local pickup leg.
pub fn transporter_for(
    kind: ShipmentKind,
    branch: Branch,
    pickup: Option<Coordinates>,
) -> Option<&'static str> {
    match kind {
        ShipmentKind::Local | ShipmentKind::Export => match pickup {
            Some(coords) if Leg::classify(branch.hub(), coords) == Leg::Remote => Some(THIRD_PARTY),
            // Unresolved pickup: driver-eligible by default.
            _ => None,
        },
        ShipmentKind::Import => None,
    }
}

/// Estimated delivery timing for an import's collection notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryEta {
    Today,
    Tomorrow,
    AsSoonAsPossible,
}

impl DeliveryEta {
    /// Estimate from the hub → delivery leg and the local collection time.
    ///
    /// Within driver range: same-day before the 13:00 cutoff, next-day
    /// after. Out of range or unresolved: no promise is made.
    pub fn estimate(
        branch: Branch,
        delivery: Option<Coordinates>,
        collected_at: chrono::NaiveTime,
    ) -> Self {
        let Some(coords) = delivery else {
            return DeliveryEta::AsSoonAsPossible;
        };
        if Leg::classify(branch.hub(), coords) == Leg::Remote {
            return DeliveryEta::AsSoonAsPossible;
        }
        if collected_at.hour() < SAME_DAY_CUTOFF_HOUR {
            DeliveryEta::Today
        } else {
            DeliveryEta::Tomorrow
        }
    }

    /// Client-facing sentence fragment, continuing "…has been collected and".
    pub fn client_text(self) -> &'static str {
        match self {
            DeliveryEta::Today => "will be delivered today",
            DeliveryEta::Tomorrow => "will be delivered tomorrow",
            DeliveryEta::AsSoonAsPossible => "will be delivered as soon as possible",
        }
    }
}
