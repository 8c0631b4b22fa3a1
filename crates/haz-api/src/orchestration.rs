//! # Booking & Scan Confirmation Orchestration
//!
//! The flows that tie the domain crates together: booking (resolve →
//! dispatch decision → insert → notify) and scan confirmation (atomic
//! transition → POD → completed record → notify). Route handlers parse and
//! validate requests, then call in here with typed inputs.
//!
//! The ordering rule throughout: the state transition commits first, and
//! everything after it — POD generation, completed record, write-through,
//! notification — never unwinds it.

use chrono::{DateTime, Utc};

use haz_core::{Branch, DriverCode, Route, ShipmentKind, ShipmentRef};
use haz_geo::{transporter_for, DeliveryEta};
use haz_pod::{Condition, DeliveryRecord};
use haz_state::ScanStage;

use crate::error::AppError;
use crate::notifications::NotificationEvent;
use crate::state::{AppState, CompletedRecord, ShipmentRecord};

/// A validated booking, ready to become a shipment.
#[derive(Debug, Clone)]
pub struct BookingInput {
    pub reference: ShipmentRef,
    pub secondary_ref: Option<String>,
    pub kind: ShipmentKind,
    pub branch: Branch,
    pub company: String,
    pub operator: String,
    pub pickup_address: Option<String>,
    pub delivery_address: Option<String>,
    pub recipients: Vec<String>,
}

/// Delivery-confirmation details from a scan or an ops POD request.
#[derive(Debug, Clone, Default)]
pub struct DeliveryDetails {
    pub signed_by: Option<String>,
    pub condition: Option<Condition>,
    pub notes: Option<String>,
    pub signature_b64: Option<String>,
}

/// Result of a confirmed scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub timestamp: DateTime<Utc>,
    /// Present for delivery confirmations only.
    pub pod_path: Option<std::path::PathBuf>,
}

/// Book a shipment: resolve addresses, decide driver vs. carrier, persist
/// `Pending`, and emit the booking notification.
pub async fn book_shipment(
    state: &AppState,
    input: BookingInput,
) -> Result<ShipmentRecord, AppError> {
    // Resolve whatever addresses were supplied; unresolved is fine.
    let pickup = match input.pickup_address {
        Some(addr) => {
            let coords = state.resolver.resolve(&addr).await;
            Some((addr, coords))
        }
        None => None,
    };
    let delivery = match input.delivery_address {
        Some(addr) => {
            let coords = state.resolver.resolve(&addr).await;
            Some((addr, coords))
        }
        None => None,
    };

    // The kind's address invariant is enforced here, before anything persists.
    let route = Route::for_kind(input.kind, pickup, delivery)?;

    let transporter = transporter_for(
        input.kind,
        input.branch,
        route.pickup().and_then(|s| s.coordinates),
    )
    .map(String::from);

    let now = Utc::now();
    let record = ShipmentRecord {
        reference: input.reference,
        secondary_ref: input.secondary_ref,
        branch: input.branch,
        company: input.company,
        operator: input.operator,
        status: haz_state::ShipmentStatus::Pending,
        route,
        driver: None,
        transporter,
        recipients: input.recipients,
        thread_anchor: None,
        version: 0,
        created_at: now,
        updated_at: now,
    };

    state.shipments.insert_new(record.clone())?;

    // Write-through. Creation failure is surfaced: an in-memory-only record
    // would silently vanish on restart.
    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::shipments::insert(pool, &record).await {
            tracing::error!(reference = %record.reference, error = %e, "shipment insert write-through failed");
            return Err(AppError::Internal(
                "shipment recorded in-memory but database persist failed".to_string(),
            ));
        }
    }

    state.notifications.emit(NotificationEvent::Booked {
        reference: record.reference.as_str().to_string(),
    });

    Ok(record)
}

/// Confirm a driver scan.
pub async fn confirm_scan(
    state: &AppState,
    reference: &str,
    driver: Option<DriverCode>,
    stage: ScanStage,
    details: DeliveryDetails,
) -> Result<ScanOutcome, AppError> {
    match stage {
        ScanStage::Collection => {
            let record = state.shipments.apply_scan(reference, stage, driver)?;
            write_through(state, &record).await;
            state.notifications.emit(NotificationEvent::Collected {
                reference: record.reference.as_str().to_string(),
            });
            Ok(ScanOutcome {
                timestamp: record.updated_at,
                pod_path: None,
            })
        }
        ScanStage::Delivery => confirm_delivery(state, reference, details).await,
    }
}

/// Confirm a delivery — from a driver scan or the ops escape path for
/// third-party carriers. Applies `In Progress → Delivered`, generates the
/// POD, writes the completed record, and emits the final notification.
pub async fn confirm_delivery(
    state: &AppState,
    reference: &str,
    details: DeliveryDetails,
) -> Result<ScanOutcome, AppError> {
    let record = state
        .shipments
        .apply_scan(reference, ScanStage::Delivery, None)?;

    // Transition committed. Nothing below unwinds it.
    let delivered_at = record.updated_at;
    let signed_by = details
        .signed_by
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| "—".to_string());

    let pod_record = DeliveryRecord {
        reference: record.reference.as_str().to_string(),
        secondary_ref: record.secondary_ref.clone(),
        company: record.company.clone(),
        signed_by: signed_by.clone(),
        delivered_at,
        condition: details.condition,
        notes: details.notes,
        signature_b64: details.signature_b64,
    };
    let pod_path = state.pods.generate(&pod_record).map_err(|e| {
        tracing::error!(reference, error = %e, "POD generation failed after delivery transition");
        AppError::Internal("delivery recorded but POD generation failed".to_string())
    })?;

    let completed = CompletedRecord {
        reference: record.reference.clone(),
        secondary_ref: record.secondary_ref.clone(),
        operator: record.operator.clone(),
        company: record.company.clone(),
        signed_by,
        delivered_at,
        pod_path: pod_path.to_string_lossy().into_owned(),
        document_path: None,
    };
    if let Err(e) = state.completed.append(completed.clone()) {
        // Structurally unreachable: the terminal transition admits one winner.
        tracing::error!(reference, error = %e, "duplicate completed record suppressed");
    }

    write_through(state, &record).await;
    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::completed::insert(pool, &completed).await {
            tracing::warn!(reference, error = %e, "completed record write-through failed");
        }
    }

    state.notifications.emit(NotificationEvent::Delivered {
        reference: record.reference.as_str().to_string(),
        pod_path: pod_path.clone(),
    });

    Ok(ScanOutcome {
        timestamp: delivered_at,
        pod_path: Some(pod_path),
    })
}

/// Emit the "collected at the airport" update for an import, with the
/// delivery-timing estimate. Imports have no local collection leg, so this
/// is an ops action rather than a scan.
pub async fn import_collected(state: &AppState, reference: &str) -> Result<DateTime<Utc>, AppError> {
    let record = state
        .shipments
        .get(reference)
        .ok_or_else(|| AppError::NotFound(format!("shipment not found: {reference}")))?;

    if record.kind() != ShipmentKind::Import {
        return Err(AppError::Validation(format!(
            "shipment {reference} is {}, not an import",
            record.kind()
        )));
    }

    let eta = DeliveryEta::estimate(
        record.branch,
        record.route.delivery().and_then(|s| s.coordinates),
        chrono::Local::now().time(),
    );

    state.notifications.emit(NotificationEvent::ImportCollected {
        reference: record.reference.as_str().to_string(),
        eta,
    });

    Ok(Utc::now())
}

/// Mirror a mutated record into the database, best-effort.
async fn write_through(state: &AppState, record: &ShipmentRecord) {
    if let Some(pool) = &state.db_pool {
        if let Err(e) = crate::db::shipments::update_after_mutation(pool, record).await {
            tracing::warn!(reference = %record.reference, error = %e, "shipment write-through failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haz_state::ShipmentStatus;

    fn booking(reference: &str, kind: ShipmentKind) -> BookingInput {
        BookingInput {
            reference: ShipmentRef::new(reference).unwrap(),
            secondary_ref: Some("HMJ055".to_string()),
            kind,
            branch: Branch::Jnb,
            company: "Acme Chemicals".to_string(),
            operator: "OPS-PETE".to_string(),
            pickup_address: Some("Sandton, Johannesburg, Gauteng, South Africa".to_string()),
            delivery_address: Some("Midrand, Johannesburg, Gauteng, South Africa".to_string()),
            recipients: vec![],
        }
    }

    fn test_state() -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new().with_pod_dir(dir.path());
        (state, dir)
    }

    #[tokio::test]
    async fn booking_resolves_catalog_addresses_and_stays_in_house() {
        let (state, _dir) = test_state();
        let record = book_shipment(&state, booking("HAZJNB0001", ShipmentKind::Local))
            .await
            .unwrap();
        assert_eq!(record.status, ShipmentStatus::Pending);
        // Both catalog addresses resolve, and Sandton is within JNB range.
        assert!(record.route.pickup().unwrap().coordinates.is_some());
        assert!(record.transporter.is_none());
    }

    #[tokio::test]
    async fn booking_remote_pickup_marks_third_party() {
        let (state, _dir) = test_state();
        let mut input = booking("HAZJNB0002", ShipmentKind::Export);
        // Durban pickup for the JNB branch: ~500 km.
        input.pickup_address = Some("Umhlanga, Durban, KwaZulu-Natal, South Africa".to_string());
        input.delivery_address = None;
        let record = book_shipment(&state, input).await.unwrap();
        assert_eq!(record.transporter.as_deref(), Some("Third-Party"));
    }

    #[tokio::test]
    async fn booking_missing_required_address_creates_nothing() {
        let (state, _dir) = test_state();
        let mut input = booking("HAZJNB0003", ShipmentKind::Local);
        input.delivery_address = None;
        let err = book_shipment(&state, input).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(state.shipments.is_empty());
    }

    #[tokio::test]
    async fn booking_unresolved_address_is_accepted() {
        let (state, _dir) = test_state();
        let mut input = booking("HAZJNB0004", ShipmentKind::Local);
        input.pickup_address = Some("17 Kerk St, Polokwane".to_string());
        let record = book_shipment(&state, input).await.unwrap();
        assert!(record.route.pickup().unwrap().coordinates.is_none());
        // Unresolved pickup defaults to driver-eligible.
        assert!(record.transporter.is_none());
    }

    #[tokio::test]
    async fn duplicate_reference_conflicts() {
        let (state, _dir) = test_state();
        book_shipment(&state, booking("HAZJNB0005", ShipmentKind::Local))
            .await
            .unwrap();
        let err = book_shipment(&state, booking("HAZJNB0005", ShipmentKind::Local))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn full_scan_lifecycle_produces_pod_and_completed_record() {
        let (state, _dir) = test_state();
        book_shipment(&state, booking("HAZJNB0006", ShipmentKind::Local))
            .await
            .unwrap();
        state
            .shipments
            .assign("HAZJNB0006", Some(DriverCode::new("DRIVER001").unwrap()), None)
            .unwrap();

        let collected = confirm_scan(
            &state,
            "HAZJNB0006",
            Some(DriverCode::new("DRIVER001").unwrap()),
            ScanStage::Collection,
            DeliveryDetails::default(),
        )
        .await
        .unwrap();
        assert!(collected.pod_path.is_none());
        assert_eq!(
            state.shipments.get("HAZJNB0006").unwrap().status,
            ShipmentStatus::InProgress
        );

        let delivered = confirm_scan(
            &state,
            "HAZJNB0006",
            None,
            ScanStage::Delivery,
            DeliveryDetails {
                signed_by: Some("T. Ndlovu".to_string()),
                condition: Some(Condition::Good),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let pod_path = delivered.pod_path.unwrap();
        assert!(pod_path.exists());
        assert_eq!(
            state.shipments.get("HAZJNB0006").unwrap().status,
            ShipmentStatus::Delivered
        );
        let completed = state.completed.list_newest_first();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].signed_by, "T. Ndlovu");
    }

    #[tokio::test]
    async fn delivery_before_collection_rejected_and_unchanged() {
        let (state, _dir) = test_state();
        book_shipment(&state, booking("HAZJNB0007", ShipmentKind::Local))
            .await
            .unwrap();
        let err = confirm_scan(
            &state,
            "HAZJNB0007",
            None,
            ScanStage::Delivery,
            DeliveryDetails::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(
            state.shipments.get("HAZJNB0007").unwrap().status,
            ShipmentStatus::Pending
        );
        assert!(state.completed.is_empty());
    }

    #[tokio::test]
    async fn second_delivery_rejected_single_completed_record() {
        let (state, _dir) = test_state();
        book_shipment(&state, booking("HAZJNB0008", ShipmentKind::Local))
            .await
            .unwrap();
        confirm_scan(
            &state,
            "HAZJNB0008",
            Some(DriverCode::new("DRIVER001").unwrap()),
            ScanStage::Collection,
            DeliveryDetails::default(),
        )
        .await
        .unwrap();
        confirm_scan(
            &state,
            "HAZJNB0008",
            None,
            ScanStage::Delivery,
            DeliveryDetails::default(),
        )
        .await
        .unwrap();

        let err = confirm_scan(
            &state,
            "HAZJNB0008",
            None,
            ScanStage::Delivery,
            DeliveryDetails::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(state.completed.len(), 1);
    }

    #[tokio::test]
    async fn unknown_reference_scan_is_not_found() {
        let (state, _dir) = test_state();
        let err = confirm_scan(
            &state,
            "HAZJNB9999",
            None,
            ScanStage::Collection,
            DeliveryDetails::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn import_collected_rejects_non_imports() {
        let (state, _dir) = test_state();
        book_shipment(&state, booking("HAZJNB0009", ShipmentKind::Local))
            .await
            .unwrap();
        let err = import_collected(&state, "HAZJNB0009").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn import_collected_accepts_imports() {
        let (state, _dir) = test_state();
        let mut input = booking("HAZJNB0010", ShipmentKind::Import);
        input.pickup_address = None;
        book_shipment(&state, input).await.unwrap();
        assert!(import_collected(&state, "HAZJNB0010").await.is_ok());
    }
}
