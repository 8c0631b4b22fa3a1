//! # Coordinates & Leg Classification
//!
//! Great-circle distance between two coordinates and the classification of a
//! shipment leg as servable by an in-house driver ("local") or requiring a
//! third-party carrier ("remote").

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Mean earth radius in kilometers, for the haversine formula.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Assumed average road speed used to derive the local radius.
pub const AVERAGE_SPEED_KMH: f64 = 60.0;

/// Maximum one-way distance an in-house driver serves: roughly two and a
/// half hours of driving at [`AVERAGE_SPEED_KMH`]. A leg at exactly this
/// distance is still local.
pub const LOCAL_RADIUS_KM: f64 = 2.5 * AVERAGE_SPEED_KMH;

/// A WGS-84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Classification of one directed shipment leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Leg {
    /// Within [`LOCAL_RADIUS_KM`] of the origin — in-house driver pool.
    Local,
    /// Beyond the local radius — third-party carrier required.
    Remote,
}

/// Great-circle distance in kilometers between two coordinates (haversine).
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();
    let h = (dlat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (dlng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

impl Leg {
    /// Classify the leg from `origin` to `destination` against
    /// [`LOCAL_RADIUS_KM`].
    pub fn classify(origin: Coordinates, destination: Coordinates) -> Self {
        if distance_km(origin, destination) <= LOCAL_RADIUS_KM {
            Self::Local
        } else {
            Self::Remote
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JNB: Coordinates = Coordinates {
        lat: -26.2041,
        lng: 28.0473,
    };
    const CPT: Coordinates = Coordinates {
        lat: -33.9249,
        lng: 18.4241,
    };
    const SANDTON: Coordinates = Coordinates {
        lat: -26.1076,
        lng: 28.0567,
    };

    #[test]
    fn distance_is_symmetric() {
        let d1 = distance_km(JNB, CPT);
        let d2 = distance_km(CPT, JNB);
        assert!((d1 - d2).abs() < 1e-9, "expected symmetry: {d1} vs {d2}");
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_km(JNB, JNB), 0.0);
    }

    #[test]
    fn jnb_to_cpt_is_about_1270_km() {
        let d = distance_km(JNB, CPT);
        assert!((1260.0..1280.0).contains(&d), "got {d}");
    }

    #[test]
    fn sandton_is_local_to_jnb_hub() {
        assert_eq!(Leg::classify(JNB, SANDTON), Leg::Local);
    }

    #[test]
    fn cape_town_is_remote_from_jnb_hub() {
        assert_eq!(Leg::classify(JNB, CPT), Leg::Remote);
    }

    /// A point on the threshold itself is still local; one hundredth of a
    /// kilometer past it is remote.
    #[test]
    fn threshold_boundary_is_inclusive() {
        // One degree of latitude is ~111.19 km on the sphere used here, so
        // construct points due north of the origin at exactly 150.0 km and
        // slightly beyond.
        let origin = Coordinates::new(0.0, 0.0);
        let deg_per_km = 1.0 / (EARTH_RADIUS_KM * std::f64::consts::PI / 180.0);

        let at_threshold = Coordinates::new(LOCAL_RADIUS_KM * deg_per_km, 0.0);
        let d = distance_km(origin, at_threshold);
        assert!((d - LOCAL_RADIUS_KM).abs() < 1e-6, "got {d}");
        assert_eq!(Leg::classify(origin, at_threshold), Leg::Local);

        let past_threshold = Coordinates::new((LOCAL_RADIUS_KM + 0.01) * deg_per_km, 0.0);
        assert_eq!(Leg::classify(origin, past_threshold), Leg::Remote);
    }

    #[test]
    fn local_radius_derivation() {
        // 2.5 hours at 60 km/h.
        assert_eq!(LOCAL_RADIUS_KM, 150.0);
    }
}
