//! # haz-core — Dispatch Domain Primitives
//!
//! Foundational types shared across the Haz dispatch stack: validated
//! identifier newtypes, the branch hub table, geographic coordinates with
//! great-circle distance and leg classification, and the kind-tagged
//! shipment route.
//!
//! ## Design Principle
//!
//! Invalid domain values are unrepresentable after construction. A
//! [`ShipmentRef`] is never empty, a [`Route`] always carries the stops its
//! shipment kind requires, and a [`Branch`] always resolves to a hub
//! coordinate. Validation happens once, at the edge.

pub mod branch;
pub mod error;
pub mod geo;
pub mod reference;
pub mod shipment;

pub use branch::Branch;
pub use error::ValidationError;
pub use geo::{distance_km, Coordinates, Leg, AVERAGE_SPEED_KMH, LOCAL_RADIUS_KM};
pub use reference::{DriverCode, ShipmentRef};
pub use shipment::{Route, ShipmentKind, Stop};
