//! # haz-geo — Geography Services for Dispatch
//!
//! Everything between a free-text address and a dispatch decision:
//!
//! - [`catalog`]: the operator's known-place table (region → area → place →
//!   canonical address + coordinates), used for booking-form dropdowns and
//!   as the offline geocoding fallback.
//! - [`geocoder`]: the external lookup behind an object-safe async trait,
//!   with a bounded per-request timeout.
//! - [`resolver`]: catalog-first, external-fallback resolution that never
//!   fails — an unresolved address is a valid low-confidence outcome.
//! - [`dispatch`]: the driver-vs-carrier decision and the import
//!   delivery-timing estimate.

pub mod catalog;
pub mod dispatch;
pub mod geocoder;
pub mod resolver;

pub use catalog::{CatalogEntry, PlaceCatalog};
pub use dispatch::{transporter_for, DeliveryEta, THIRD_PARTY};
pub use geocoder::{GeocodeError, Geocoder, NominatimGeocoder};
pub use resolver::AddressResolver;
