//! # Known-Place Catalog
//!
//! A static region → area → place table with canonical address strings and
//! coordinates for the operator's service areas. Two jobs:
//!
//! 1. Backing data for the booking form's dropdown feeds, so most bookings
//!    arrive with an exactly-resolvable canonical address.
//! 2. Offline geocoding fallback: when the external lookup is down, a
//!    free-text address mentioning a known place name still resolves to the
//!    place's centroid (coarse, but good enough for the 150 km decision).
//!
//! Addresses rarely move; the catalog is immutable and lookups are cacheable
//! indefinitely.

use haz_core::Coordinates;

/// One catalog row.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub region: &'static str,
    pub area: &'static str,
    pub place: &'static str,
    /// Canonical address string as shown in the booking form.
    pub address: &'static str,
    pub coordinates: Coordinates,
}

const fn entry(
    region: &'static str,
    area: &'static str,
    place: &'static str,
    address: &'static str,
    lat: f64,
    lng: f64,
) -> CatalogEntry {
    CatalogEntry {
        region,
        area,
        place,
        address,
        coordinates: Coordinates { lat, lng },
    }
}

/// Seed entries covering the operator's current service areas.
const ENTRIES: &[CatalogEntry] = &[
    // Gauteng
    entry(
        "Gauteng",
        "Johannesburg",
        "Sandton",
        "Sandton, Johannesburg, Gauteng, South Africa",
        -26.1076,
        28.0567,
    ),
    entry(
        "Gauteng",
        "Johannesburg",
        "Midrand",
        "Midrand, Johannesburg, Gauteng, South Africa",
        -25.9970,
        28.1260,
    ),
    entry(
        "Gauteng",
        "Pretoria",
        "Hatfield",
        "Hatfield, Pretoria, Gauteng, South Africa",
        -25.7460,
        28.2293,
    ),
    entry(
        "Gauteng",
        "Ekurhuleni",
        "Brakpan",
        "Brakpan, Ekurhuleni, Gauteng, South Africa",
        -26.2560,
        28.3200,
    ),
    // Western Cape
    entry(
        "Western Cape",
        "Cape Town",
        "CBD",
        "Cape Town City Centre, Western Cape, South Africa",
        -33.9249,
        18.4241,
    ),
    entry(
        "Western Cape",
        "Cape Town",
        "Bellville",
        "Bellville, Cape Town, Western Cape, South Africa",
        -33.9020,
        18.6270,
    ),
    // KwaZulu-Natal
    entry(
        "KwaZulu-Natal",
        "Durban",
        "Umhlanga",
        "Umhlanga, Durban, KwaZulu-Natal, South Africa",
        -29.7260,
        31.0686,
    ),
    entry(
        "KwaZulu-Natal",
        "Durban",
        "CBD",
        "Durban CBD, KwaZulu-Natal, South Africa",
        -29.8579,
        31.0292,
    ),
    // Eastern Cape
    entry(
        "Eastern Cape",
        "Gqeberha",
        "Walmer",
        "Walmer, Gqeberha, Eastern Cape, South Africa",
        -33.9806,
        25.5700,
    ),
];

/// The known-place catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceCatalog;

impl PlaceCatalog {
    pub fn new() -> Self {
        Self
    }

    /// All entries.
    pub fn entries(&self) -> &'static [CatalogEntry] {
        ENTRIES
    }

    /// Distinct regions, in catalog order.
    pub fn regions(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        for e in ENTRIES {
            if !out.contains(&e.region) {
                out.push(e.region);
            }
        }
        out
    }

    /// Distinct areas within a region (case-sensitive, as catalogued).
    pub fn areas(&self, region: &str) -> Vec<&'static str> {
        let mut out = Vec::new();
        for e in ENTRIES.iter().filter(|e| e.region == region) {
            if !out.contains(&e.area) {
                out.push(e.area);
            }
        }
        out
    }

    /// Places within a region/area pair.
    pub fn places(&self, region: &str, area: &str) -> Vec<&'static CatalogEntry> {
        ENTRIES
            .iter()
            .filter(|e| e.region == region && e.area == area)
            .collect()
    }

    /// Resolve an explicit region/area/place selection to its entry.
    pub fn select(&self, region: &str, area: &str, place: &str) -> Option<&'static CatalogEntry> {
        ENTRIES
            .iter()
            .find(|e| e.region == region && e.area == area && e.place == place)
    }

    /// Exact canonical-address match.
    pub fn by_address(&self, address: &str) -> Option<Coordinates> {
        ENTRIES
            .iter()
            .find(|e| e.address == address)
            .map(|e| e.coordinates)
    }

    /// Coarse fallback: the first catalogued place whose name occurs as a
    /// substring of the address (case-insensitive). Single-word place names
    /// like "CBD" are ambiguous across areas; first catalog hit wins, which
    /// favors the larger region the same way the booking form orders them.
    pub fn by_place_mention(&self, address: &str) -> Option<Coordinates> {
        let haystack = address.to_lowercase();
        ENTRIES
            .iter()
            .find(|e| haystack.contains(&e.place.to_lowercase()))
            .map(|e| e.coordinates)
    }
}
