//! # External Geocoder Adapter
//!
//! HTTP client for a Nominatim-compatible geocoding service behind the
//! object-safe [`Geocoder`] trait, so the resolver and tests can inject
//! alternatives.
//!
//! ## Timeout
//!
//! Geocoding is a blocking network call on the booking path; the client is
//! built with a bounded per-request timeout (default 10 s) and a timeout is
//! reported as [`GeocodeError::Timeout`], which the resolver treats the same
//! as "unresolved".

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use haz_core::Coordinates;

/// Errors from an external geocoding lookup. None of these are fatal to the
/// caller — the resolver degrades to catalog-only accuracy.
#[derive(Error, Debug)]
pub enum GeocodeError {
    /// The request exceeded the configured timeout.
    #[error("geocoding request timed out after {elapsed_secs}s")]
    Timeout { elapsed_secs: u64 },

    /// Transport failure or non-success HTTP status.
    #[error("geocoding service unavailable: {reason}")]
    Unavailable { reason: String },

    /// The service answered but the payload was not understood.
    #[error("geocoding response malformed: {reason}")]
    Malformed { reason: String },
}

/// Resolves a free-text address to coordinates. `Ok(None)` means the service
/// answered but found nothing — "unresolved", a valid outcome.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Configuration for [`NominatimGeocoder`].
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL of the service (e.g. `https://nominatim.openstreetmap.org`).
    pub base_url: String,
    /// Per-request timeout in seconds (default: 10).
    pub timeout_secs: u64,
}

impl NominatimConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 10,
        }
    }
}

/// A result row from the Nominatim search API. Coordinates arrive as
/// strings.
#[derive(Debug, Deserialize)]
struct SearchRow {
    lat: String,
    lon: String,
}

/// HTTP client for a Nominatim-compatible `/search` endpoint.
#[derive(Debug)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl NominatimGeocoder {
    /// Build the client from configuration.
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("haz-dispatch/0.3")
            .build()
            .map_err(|e| GeocodeError::Unavailable {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, address: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodeError::Timeout {
                        elapsed_secs: self.timeout_secs,
                    }
                } else {
                    GeocodeError::Unavailable {
                        reason: e.to_string(),
                    }
                }
            })?;

        if !resp.status().is_success() {
            return Err(GeocodeError::Unavailable {
                reason: format!("HTTP {}", resp.status()),
            });
        }

        let rows: Vec<SearchRow> = resp.json().await.map_err(|e| GeocodeError::Malformed {
            reason: e.to_string(),
        })?;

        let Some(row) = rows.into_iter().next() else {
            return Ok(None);
        };

        let lat = row.lat.parse::<f64>().map_err(|e| GeocodeError::Malformed {
            reason: format!("latitude {:?}: {e}", row.lat),
        })?;
        let lng = row.lon.parse::<f64>().map_err(|e| GeocodeError::Malformed {
            reason: format!("longitude {:?}: {e}", row.lon),
        })?;

        Ok(Some(Coordinates::new(lat, lng)))
    }
}
