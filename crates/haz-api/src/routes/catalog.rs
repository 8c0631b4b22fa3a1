//! # Place Catalog & Address Resolution API
//!
//! Dropdown feeds for the booking form (region → area → place) and the
//! explicit resolve endpoint it calls before submitting. Catalog data is
//! immutable, so these responses are cacheable indefinitely.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::{extract_validated_json, Validate};
use crate::state::AppState;

/// Region list.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegionsResponse {
    pub regions: Vec<String>,
}

/// Areas within a region.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AreasResponse {
    pub region: String,
    pub areas: Vec<String>,
}

/// One selectable place.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlaceInfo {
    pub place: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
}

/// Places within a region/area pair.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PlacesResponse {
    pub region: String,
    pub area: String,
    pub places: Vec<PlaceInfo>,
}

/// Resolve either a free-text address or an explicit catalog selection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveRequest {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
}

impl Validate for ResolveRequest {
    fn validate(&self) -> Result<(), String> {
        let has_selection =
            self.region.is_some() && self.area.is_some() && self.place.is_some();
        if self.address.is_none() && !has_selection {
            return Err(
                "provide an address or a full region/area/place selection".to_string(),
            );
        }
        Ok(())
    }
}

/// A resolved address with its provenance.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ResolveResponse {
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    /// `"catalog"` or `"geocode"`.
    pub source: String,
}

/// Build the catalog router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/catalog/regions", get(regions))
        .route("/v1/catalog/:region/areas", get(areas))
        .route("/v1/catalog/:region/:area/places", get(places))
        .route("/v1/geocode/resolve", post(resolve))
}

/// GET /v1/catalog/regions — Distinct regions.
#[utoipa::path(
    get,
    path = "/v1/catalog/regions",
    responses((status = 200, description = "Regions", body = RegionsResponse)),
    tag = "catalog"
)]
pub(crate) async fn regions(State(state): State<AppState>) -> Json<RegionsResponse> {
    Json(RegionsResponse {
        regions: state
            .resolver
            .catalog()
            .regions()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

/// GET /v1/catalog/:region/areas — Areas within a region.
#[utoipa::path(
    get,
    path = "/v1/catalog/{region}/areas",
    params(("region" = String, Path, description = "Region name")),
    responses((status = 200, description = "Areas", body = AreasResponse)),
    tag = "catalog"
)]
pub(crate) async fn areas(State(state): State<AppState>, Path(region): Path<String>) -> Json<AreasResponse> {
    Json(AreasResponse {
        areas: state
            .resolver
            .catalog()
            .areas(&region)
            .into_iter()
            .map(String::from)
            .collect(),
        region,
    })
}

/// GET /v1/catalog/:region/:area/places — Places with coordinates.
#[utoipa::path(
    get,
    path = "/v1/catalog/{region}/{area}/places",
    params(
        ("region" = String, Path, description = "Region name"),
        ("area" = String, Path, description = "Area name"),
    ),
    responses((status = 200, description = "Places", body = PlacesResponse)),
    tag = "catalog"
)]
pub(crate) async fn places(
    State(state): State<AppState>,
    Path((region, area)): Path<(String, String)>,
) -> Json<PlacesResponse> {
    Json(PlacesResponse {
        places: state
            .resolver
            .catalog()
            .places(&region, &area)
            .into_iter()
            .map(|e| PlaceInfo {
                place: e.place.to_string(),
                address: e.address.to_string(),
                lat: e.coordinates.lat,
                lng: e.coordinates.lng,
            })
            .collect(),
        region,
        area,
    })
}

/// POST /v1/geocode/resolve — Resolve a selection or free-text address.
#[utoipa::path(
    post,
    path = "/v1/geocode/resolve",
    request_body = ResolveRequest,
    responses(
        (status = 200, description = "Resolved", body = ResolveResponse),
        (status = 400, description = "Unresolvable", body = crate::error::ErrorBody),
    ),
    tag = "catalog"
)]
pub(crate) async fn resolve(
    State(state): State<AppState>,
    body: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<Json<ResolveResponse>, AppError> {
    let req = extract_validated_json(body)?;

    // An explicit dropdown selection wins.
    if let (Some(region), Some(area), Some(place)) = (&req.region, &req.area, &req.place) {
        if let Some(entry) = state.resolver.catalog().select(region, area, place) {
            return Ok(Json(ResolveResponse {
                address: entry.address.to_string(),
                lat: entry.coordinates.lat,
                lng: entry.coordinates.lng,
                source: "catalog".to_string(),
            }));
        }
    }

    if let Some(address) = &req.address {
        if let Some(coords) = state.resolver.resolve(address).await {
            return Ok(Json(ResolveResponse {
                address: address.clone(),
                lat: coords.lat,
                lng: coords.lng,
                source: "geocode".to_string(),
            }));
        }
    }

    Err(AppError::Validation("unable to resolve address".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app() -> Router {
        router().with_state(AppState::new())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn regions_feed() {
        let (status, body) = get_json(app(), "/v1/catalog/regions").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["regions"][0], "Gauteng");
    }

    #[tokio::test]
    async fn areas_feed() {
        let (status, body) = get_json(app(), "/v1/catalog/Gauteng/areas").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["areas"],
            serde_json::json!(["Johannesburg", "Pretoria", "Ekurhuleni"])
        );
    }

    #[tokio::test]
    async fn places_feed_includes_coordinates() {
        let (status, body) = get_json(app(), "/v1/catalog/Gauteng/Johannesburg/places").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["places"][0]["place"], "Sandton");
        assert!(body["places"][0]["lat"].is_number());
    }

    #[tokio::test]
    async fn resolve_by_selection_uses_catalog() {
        let (status, body) = post_json(
            app(),
            "/v1/geocode/resolve",
            r#"{"region": "Gauteng", "area": "Pretoria", "place": "Hatfield"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "catalog");
        assert_eq!(body["address"], "Hatfield, Pretoria, Gauteng, South Africa");
    }

    #[tokio::test]
    async fn resolve_by_address_falls_back_to_resolver() {
        let (status, body) = post_json(
            app(),
            "/v1/geocode/resolve",
            r#"{"address": "1 Main Rd, Bellville"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "geocode");
    }

    #[tokio::test]
    async fn unresolvable_returns_400() {
        let (status, _) = post_json(
            app(),
            "/v1/geocode/resolve",
            r#"{"address": "17 Kerk St, Polokwane"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_request_returns_400() {
        let (status, _) = post_json(app(), "/v1/geocode/resolve", r#"{}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
