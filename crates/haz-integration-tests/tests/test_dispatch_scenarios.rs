//! # Dispatch Decision Scenarios
//!
//! The geography-driven acceptance scenarios, end to end through the API:
//! nearby pickups stay in the driver pool, remote pickups go to a
//! third-party carrier, the threshold is inclusive at exactly 150 km, and
//! an unresolved address never blocks a booking.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use haz_api::state::AppState;
use haz_core::{distance_km, Branch, Coordinates, Leg, LOCAL_RADIUS_KM};

fn test_app() -> (axum::Router, AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new().with_pod_dir(dir.path());
    (haz_api::app(state.clone()), state, dir)
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn booking(reference: &str, kind: &str, pickup: Option<&str>, delivery: Option<&str>) -> String {
    let mut body = serde_json::json!({
        "reference": reference,
        "kind": kind,
        "branch": "JNB",
        "company": "Acme Chemicals",
        "operator": "OPS-PETE",
    });
    if let Some(p) = pickup {
        body["pickup_address"] = p.into();
    }
    if let Some(d) = delivery {
        body["delivery_address"] = d.into();
    }
    body.to_string()
}

#[tokio::test]
async fn local_within_hub_radius_has_no_transporter() {
    let (app, state, _dir) = test_app();

    // Sandton and Midrand both resolve from the catalog, ~13 km apart and
    // well within the JNB hub radius.
    let resp = app
        .oneshot(post_json(
            "/v1/shipments",
            booking(
                "HAZJNB0300",
                "local",
                Some("Sandton, Johannesburg, Gauteng, South Africa"),
                Some("Midrand, Johannesburg, Gauteng, South Africa"),
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert!(created.get("transporter").is_none());

    let record = state.shipments.get("HAZJNB0300").unwrap();
    let pickup = record.route.pickup().unwrap().coordinates.unwrap();
    let delivery = record.route.delivery().unwrap().coordinates.unwrap();
    assert!(distance_km(pickup, delivery) < 20.0);
}

#[tokio::test]
async fn export_roughly_300_km_from_hub_goes_third_party() {
    let (app, _, _dir) = test_app();

    // Walmer (Gqeberha) is far beyond JNB's 150 km radius.
    let resp = app
        .oneshot(post_json(
            "/v1/shipments",
            booking(
                "HAZJNB0301",
                "export",
                Some("Walmer, Gqeberha, Eastern Cape, South Africa"),
                None,
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["transporter"], "Third-Party");
}

#[tokio::test]
async fn import_with_remote_delivery_keeps_driver_pool() {
    let (app, _, _dir) = test_app();

    // Imports have no pickup leg; even a remote delivery leg does not set
    // the transporter marker.
    let resp = app
        .oneshot(post_json(
            "/v1/shipments",
            booking(
                "HAZJNB0302",
                "import",
                None,
                Some("Cape Town City Centre, Western Cape, South Africa"),
            ),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert!(created.get("transporter").is_none());
}

#[tokio::test]
async fn unresolved_pickup_books_driver_eligible() {
    let (app, state, _dir) = test_app();

    let resp = app
        .oneshot(post_json(
            "/v1/shipments",
            booking("HAZJNB0303", "export", Some("17 Kerk St, Polokwane"), None),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert!(created.get("transporter").is_none());
    assert!(state
        .shipments
        .get("HAZJNB0303")
        .unwrap()
        .route
        .pickup()
        .unwrap()
        .coordinates
        .is_none());
}

// -- Distance evaluator properties --------------------------------------------

#[test]
fn distance_symmetry_and_identity_across_hubs() {
    for a in Branch::ALL {
        for b in Branch::ALL {
            let d_ab = distance_km(a.hub(), b.hub());
            let d_ba = distance_km(b.hub(), a.hub());
            assert!((d_ab - d_ba).abs() < 1e-9);
        }
        assert_eq!(distance_km(a.hub(), a.hub()), 0.0);
    }
}

#[test]
fn threshold_is_inclusive_at_exactly_150_km() {
    // Construct a point due north of the JNB hub at exactly the threshold
    // distance, then nudge past it.
    let hub = Branch::Jnb.hub();
    let deg_per_km = 1.0 / (distance_km(hub, Coordinates::new(hub.lat + 1.0, hub.lng)));

    let at = Coordinates::new(hub.lat + LOCAL_RADIUS_KM * deg_per_km, hub.lng);
    let past = Coordinates::new(hub.lat + (LOCAL_RADIUS_KM + 0.01) * deg_per_km, hub.lng);

    assert!((distance_km(hub, at) - 150.0).abs() < 1e-6);
    assert_eq!(Leg::classify(hub, at), Leg::Local);
    assert_eq!(Leg::classify(hub, past), Leg::Remote);
}
