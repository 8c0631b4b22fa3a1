//! # Degrading Address Resolver
//!
//! Resolution order: catalog exact address → catalog place-name mention →
//! external geocoder. The resolver itself never fails; every failure mode
//! collapses to `None` ("unresolved") with a logged warning, because a
//! booking must not be blocked by a geocoding outage.

use std::sync::Arc;

use haz_core::Coordinates;

use crate::catalog::PlaceCatalog;
use crate::geocoder::Geocoder;

/// Catalog-first address resolution with optional external fallback.
#[derive(Clone)]
pub struct AddressResolver {
    catalog: PlaceCatalog,
    external: Option<Arc<dyn Geocoder>>,
}

impl AddressResolver {
    /// Catalog-only resolver (no external service configured).
    pub fn catalog_only() -> Self {
        Self {
            catalog: PlaceCatalog::new(),
            external: None,
        }
    }

    /// Resolver with an external geocoder fallback.
    pub fn with_external(external: Arc<dyn Geocoder>) -> Self {
        Self {
            catalog: PlaceCatalog::new(),
            external: Some(external),
        }
    }

    /// The catalog, for dropdown feeds and explicit selections.
    pub fn catalog(&self) -> &PlaceCatalog {
        &self.catalog
    }

    /// Resolve an address to coordinates, or `None` when every layer comes
    /// up empty. Infallible by contract.
    pub async fn resolve(&self, address: &str) -> Option<Coordinates> {
        if address.trim().is_empty() {
            return None;
        }

        if let Some(coords) = self.catalog.by_address(address) {
            return Some(coords);
        }
        if let Some(coords) = self.catalog.by_place_mention(address) {
            return Some(coords);
        }

        match &self.external {
            Some(geocoder) => match geocoder.resolve(address).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(address, error = %e, "external geocoding failed, proceeding unresolved");
                    None
                }
            },
            None => None,
        }
    }
}

impl std::fmt::Debug for AddressResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AddressResolver")
            .field("external", &self.external.is_some())
            .finish()
    }
}
