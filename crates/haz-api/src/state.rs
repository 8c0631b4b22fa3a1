//! # Application State & Shipment Store
//!
//! The shipment store is the single source of truth for lifecycle state.
//! Records live in a `DashMap` keyed by waybill reference; every mutation is
//! a read-validate-update sequence held under the entry's write lock, so two
//! concurrent scans for the same shipment serialize and the loser is
//! rejected by the state check rather than double-applying. The optional
//! Postgres layer is write-through behind this store, never consulted for
//! transition decisions.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use haz_core::{Branch, DriverCode, Route, ShipmentKind, ShipmentRef};
use haz_state::{LifecycleError, ScanStage, ShipmentStatus};

use crate::notifications::NotificationSender;

/// Service configuration, read from the environment in `main`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// Directory POD artifacts are written to.
    pub pod_dir: String,
    /// Sender address for client notifications; gateway disabled when the
    /// API key is absent.
    pub sendgrid_api_key: Option<String>,
    pub from_email: String,
    /// External geocoder base URL; catalog-only resolution when absent.
    pub geocoder_url: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            pod_dir: "pods".to_string(),
            sendgrid_api_key: None,
            from_email: "dispatch@hazglobal.com".to_string(),
            geocoder_url: None,
        }
    }
}

impl AppConfig {
    /// Read configuration from the environment, defaulting every field.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: std::env::var("HAZ_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.port),
            pod_dir: std::env::var("HAZ_POD_DIR").unwrap_or(defaults.pod_dir),
            sendgrid_api_key: std::env::var("SENDGRID_API_KEY").ok(),
            from_email: std::env::var("HAZ_FROM_EMAIL").unwrap_or(defaults.from_email),
            geocoder_url: std::env::var("HAZ_GEOCODER_URL").ok(),
        }
    }
}

/// The durable record of one shipment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ShipmentRecord {
    pub reference: ShipmentRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_ref: Option<String>,
    pub branch: Branch,
    pub company: String,
    pub operator: String,
    pub status: ShipmentStatus,
    /// Kind-tagged stops; serializes its `kind` tag into the record body.
    #[serde(flatten)]
    pub route: Route,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver: Option<DriverCode>,
    /// Carrier marker or code; `"Third-Party"` when the dispatch decision
    /// ruled out the in-house pool.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transporter: Option<String>,
    pub recipients: Vec<String>,
    /// Most recent gateway message id for mail threading.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_anchor: Option<String>,
    /// Bumped on every mutation; lets the write-through layer and tests
    /// observe lost-update prevention.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShipmentRecord {
    pub fn kind(&self) -> ShipmentKind {
        self.route.kind()
    }
}

/// Write-once snapshot of a delivered shipment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompletedRecord {
    pub reference: ShipmentRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_ref: Option<String>,
    pub operator: String,
    pub company: String,
    pub signed_by: String,
    pub delivered_at: DateTime<Utc>,
    /// Path of the generated proof-of-delivery artifact.
    pub pod_path: String,
    /// Path of the shipment document, when one was uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_path: Option<String>,
}

/// Errors from shipment store operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No shipment with the given reference.
    #[error("shipment not found: {0}")]
    NotFound(String),

    /// A shipment with this reference already exists.
    #[error("shipment reference already exists: {0}")]
    DuplicateReference(String),

    /// The requested transition is illegal for the current status.
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Concurrent in-memory shipment store.
pub struct ShipmentStore {
    shipments: DashMap<String, ShipmentRecord>,
}

impl ShipmentStore {
    pub fn new() -> Self {
        Self {
            shipments: DashMap::new(),
        }
    }

    /// Insert a newly booked shipment, rejecting duplicate references.
    pub fn insert_new(&self, record: ShipmentRecord) -> Result<(), StoreError> {
        match self.shipments.entry(record.reference.as_str().to_string()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(StoreError::DuplicateReference(
                record.reference.as_str().to_string(),
            )),
            dashmap::mapref::entry::Entry::Vacant(v) => {
                v.insert(record);
                Ok(())
            }
        }
    }

    /// Insert without conflict checks (startup hydration from the database).
    pub fn hydrate(&self, record: ShipmentRecord) {
        self.shipments
            .insert(record.reference.as_str().to_string(), record);
    }

    pub fn get(&self, reference: &str) -> Option<ShipmentRecord> {
        self.shipments.get(reference).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.shipments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shipments.is_empty()
    }

    /// Assign a driver and/or carrier. Idempotent before collection;
    /// rejected once the shipment is moving.
    pub fn assign(
        &self,
        reference: &str,
        driver: Option<DriverCode>,
        transporter: Option<String>,
    ) -> Result<ShipmentRecord, StoreError> {
        let mut entry = self
            .shipments
            .get_mut(reference)
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))?;
        let record = entry.value_mut();

        let next = record.status.assign()?;
        record.status = next;
        if driver.is_some() {
            record.driver = driver;
        }
        if transporter.is_some() {
            record.transporter = transporter;
        }
        record.version += 1;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    /// Apply a scan event atomically. The lifecycle check runs under the
    /// entry lock, so of two concurrent scans exactly one succeeds.
    pub fn apply_scan(
        &self,
        reference: &str,
        stage: ScanStage,
        driver: Option<DriverCode>,
    ) -> Result<ShipmentRecord, StoreError> {
        let mut entry = self
            .shipments
            .get_mut(reference)
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))?;
        let record = entry.value_mut();

        let next = record.status.apply_scan(stage)?;
        record.status = next;
        if stage == ScanStage::Collection {
            // The scan confirms who actually collected.
            if let Some(code) = driver {
                record.driver = Some(code);
            }
        }
        record.version += 1;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    /// Ops escape hatch: set the status directly, bypassing the machine.
    pub fn override_status(
        &self,
        reference: &str,
        status: ShipmentStatus,
        driver: Option<DriverCode>,
    ) -> Result<ShipmentRecord, StoreError> {
        let mut entry = self
            .shipments
            .get_mut(reference)
            .ok_or_else(|| StoreError::NotFound(reference.to_string()))?;
        let record = entry.value_mut();
        record.status = status;
        if driver.is_some() {
            record.driver = driver;
        }
        record.version += 1;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    /// Store a new thread anchor after a successful notification send.
    pub fn set_thread_anchor(&self, reference: &str, anchor: String) -> Option<ShipmentRecord> {
        let mut entry = self.shipments.get_mut(reference)?;
        let record = entry.value_mut();
        record.thread_anchor = Some(anchor);
        record.version += 1;
        Some(record.clone())
    }

    /// Shipments awaiting a driver: pending or assigned with no driver set.
    pub fn unassigned(&self) -> Vec<ShipmentRecord> {
        self.shipments
            .iter()
            .filter(|r| {
                matches!(
                    r.status,
                    ShipmentStatus::Pending | ShipmentStatus::Assigned
                ) && r.driver.is_none()
            })
            .map(|r| r.value().clone())
            .collect()
    }

    /// Shipments with a driver that are assigned or moving.
    pub fn assigned(&self) -> Vec<ShipmentRecord> {
        self.shipments
            .iter()
            .filter(|r| {
                r.driver.is_some()
                    && matches!(
                        r.status,
                        ShipmentStatus::Assigned | ShipmentStatus::InProgress
                    )
            })
            .map(|r| r.value().clone())
            .collect()
    }

    /// A driver's worklist: their assigned and in-progress shipments.
    pub fn driver_jobs(&self, code: &str) -> Vec<ShipmentRecord> {
        self.shipments
            .iter()
            .filter(|r| {
                r.driver.as_ref().is_some_and(|d| d.as_str() == code)
                    && matches!(
                        r.status,
                        ShipmentStatus::Assigned | ShipmentStatus::InProgress
                    )
            })
            .map(|r| r.value().clone())
            .collect()
    }

    /// A driver's delivery worklist: in-progress only.
    pub fn driver_deliveries(&self, code: &str) -> Vec<ShipmentRecord> {
        self.shipments
            .iter()
            .filter(|r| {
                r.driver.as_ref().is_some_and(|d| d.as_str() == code)
                    && r.status == ShipmentStatus::InProgress
            })
            .map(|r| r.value().clone())
            .collect()
    }
}

impl Default for ShipmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ShipmentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShipmentStore")
            .field("shipments", &self.shipments.len())
            .finish()
    }
}

/// Append-only log of completed shipments.
#[derive(Debug, Default)]
pub struct CompletedLog {
    records: RwLock<Vec<CompletedRecord>>,
}

impl CompletedLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the completion snapshot. At most one record per reference;
    /// the terminal state machine already guarantees this, so a duplicate
    /// here indicates a bug upstream.
    pub fn append(&self, record: CompletedRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().expect("completed log poisoned");
        if records.iter().any(|r| r.reference == record.reference) {
            return Err(StoreError::DuplicateReference(
                record.reference.as_str().to_string(),
            ));
        }
        records.push(record);
        Ok(())
    }

    /// Hydrate from the database without uniqueness checks.
    pub fn hydrate(&self, record: CompletedRecord) {
        self.records
            .write()
            .expect("completed log poisoned")
            .push(record);
    }

    /// All records, newest first.
    pub fn list_newest_first(&self) -> Vec<CompletedRecord> {
        let records = self.records.read().expect("completed log poisoned");
        let mut out: Vec<_> = records.clone();
        out.reverse();
        out
    }

    pub fn len(&self) -> usize {
        self.records.read().expect("completed log poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared application state. Cheaply cloneable; all clones share the same
/// stores.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub shipments: Arc<ShipmentStore>,
    pub completed: Arc<CompletedLog>,
    pub resolver: Arc<haz_geo::AddressResolver>,
    pub pods: Arc<haz_pod::PodGenerator>,
    pub notifications: NotificationSender,
    pub db_pool: Option<sqlx::PgPool>,
}

impl AppState {
    /// In-memory state with defaults — catalog-only resolution, no mail
    /// gateway, no database. What tests use.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default(), None)
    }

    pub fn with_config(config: AppConfig, db_pool: Option<sqlx::PgPool>) -> Self {
        let resolver = match &config.geocoder_url {
            Some(url) => {
                match haz_geo::NominatimGeocoder::new(haz_geo::geocoder::NominatimConfig::new(
                    url.clone(),
                )) {
                    Ok(geocoder) => haz_geo::AddressResolver::with_external(Arc::new(geocoder)),
                    Err(e) => {
                        tracing::warn!(error = %e, "geocoder construction failed; catalog-only resolution");
                        haz_geo::AddressResolver::catalog_only()
                    }
                }
            }
            None => haz_geo::AddressResolver::catalog_only(),
        };
        let pods = haz_pod::PodGenerator::new(&config.pod_dir);
        Self {
            config: Arc::new(config),
            shipments: Arc::new(ShipmentStore::new()),
            completed: Arc::new(CompletedLog::new()),
            resolver: Arc::new(resolver),
            pods: Arc::new(pods),
            notifications: NotificationSender::disabled(),
            db_pool,
        }
    }

    /// Replace the POD output directory (tests point this at a tempdir).
    pub fn with_pod_dir(mut self, dir: impl Into<std::path::PathBuf>) -> Self {
        self.pods = Arc::new(haz_pod::PodGenerator::new(dir.into()));
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haz_core::Route;

    fn record(reference: &str) -> ShipmentRecord {
        let now = Utc::now();
        ShipmentRecord {
            reference: ShipmentRef::new(reference).unwrap(),
            secondary_ref: None,
            branch: Branch::Jnb,
            company: "Acme Chemicals".to_string(),
            operator: "OPS-PETE".to_string(),
            status: ShipmentStatus::Pending,
            route: Route::for_kind(
                ShipmentKind::Local,
                Some(("Sandton".to_string(), None)),
                Some(("Midrand".to_string(), None)),
            )
            .unwrap(),
            driver: None,
            transporter: None,
            recipients: vec![],
            thread_anchor: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn driver(code: &str) -> DriverCode {
        DriverCode::new(code).unwrap()
    }

    #[test]
    fn insert_rejects_duplicate_reference() {
        let store = ShipmentStore::new();
        store.insert_new(record("HAZJNB0001")).unwrap();
        let err = store.insert_new(record("HAZJNB0001")).unwrap_err();
        assert_eq!(
            err,
            StoreError::DuplicateReference("HAZJNB0001".to_string())
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn assign_sets_driver_and_bumps_version() {
        let store = ShipmentStore::new();
        store.insert_new(record("HAZJNB0001")).unwrap();
        let updated = store
            .assign("HAZJNB0001", Some(driver("DRIVER001")), None)
            .unwrap();
        assert_eq!(updated.status, ShipmentStatus::Assigned);
        assert_eq!(updated.driver.unwrap().as_str(), "DRIVER001");
        assert_eq!(updated.version, 1);
    }

    #[test]
    fn reassign_overwrites_driver() {
        let store = ShipmentStore::new();
        store.insert_new(record("HAZJNB0001")).unwrap();
        store
            .assign("HAZJNB0001", Some(driver("DRIVER001")), None)
            .unwrap();
        let updated = store
            .assign("HAZJNB0001", Some(driver("DRIVER002")), None)
            .unwrap();
        assert_eq!(updated.driver.unwrap().as_str(), "DRIVER002");
        assert_eq!(updated.status, ShipmentStatus::Assigned);
    }

    #[test]
    fn scan_sequence_advances_lifecycle() {
        let store = ShipmentStore::new();
        store.insert_new(record("HAZJNB0001")).unwrap();
        store
            .assign("HAZJNB0001", Some(driver("DRIVER001")), None)
            .unwrap();

        let collected = store
            .apply_scan("HAZJNB0001", ScanStage::Collection, None)
            .unwrap();
        assert_eq!(collected.status, ShipmentStatus::InProgress);

        let delivered = store
            .apply_scan("HAZJNB0001", ScanStage::Delivery, None)
            .unwrap();
        assert_eq!(delivered.status, ShipmentStatus::Delivered);
    }

    #[test]
    fn collection_scan_sets_missing_driver() {
        let store = ShipmentStore::new();
        store.insert_new(record("HAZJNB0001")).unwrap();
        let updated = store
            .apply_scan("HAZJNB0001", ScanStage::Collection, Some(driver("DRIVER007")))
            .unwrap();
        assert_eq!(updated.driver.unwrap().as_str(), "DRIVER007");
    }

    #[test]
    fn delivery_scan_before_collection_rejected() {
        let store = ShipmentStore::new();
        store.insert_new(record("HAZJNB0001")).unwrap();
        let err = store
            .apply_scan("HAZJNB0001", ScanStage::Delivery, None)
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Lifecycle(LifecycleError::UnexpectedStage { .. })
        ));
        // Status untouched.
        assert_eq!(
            store.get("HAZJNB0001").unwrap().status,
            ShipmentStatus::Pending
        );
    }

    #[test]
    fn second_delivery_scan_rejected() {
        let store = ShipmentStore::new();
        store.insert_new(record("HAZJNB0001")).unwrap();
        store
            .apply_scan("HAZJNB0001", ScanStage::Collection, None)
            .unwrap();
        store
            .apply_scan("HAZJNB0001", ScanStage::Delivery, None)
            .unwrap();
        let err = store
            .apply_scan("HAZJNB0001", ScanStage::Delivery, None)
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::Lifecycle(LifecycleError::AlreadyDelivered)
        );
    }

    #[test]
    fn unknown_reference_is_not_found() {
        let store = ShipmentStore::new();
        let err = store
            .apply_scan("HAZJNB9999", ScanStage::Collection, None)
            .unwrap_err();
        assert_eq!(err, StoreError::NotFound("HAZJNB9999".to_string()));
    }

    #[test]
    fn concurrent_delivery_scans_exactly_one_wins() {
        let store = Arc::new(ShipmentStore::new());
        store.insert_new(record("HAZJNB0001")).unwrap();
        store
            .apply_scan("HAZJNB0001", ScanStage::Collection, None)
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                store
                    .apply_scan("HAZJNB0001", ScanStage::Delivery, None)
                    .is_ok()
            }));
        }
        let wins: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();
        assert_eq!(wins, 1, "exactly one concurrent delivery scan may succeed");
    }

    #[test]
    fn dashboard_feeds_filter_correctly() {
        let store = ShipmentStore::new();
        store.insert_new(record("HAZJNB0001")).unwrap();
        store.insert_new(record("HAZJNB0002")).unwrap();
        store
            .assign("HAZJNB0002", Some(driver("DRIVER001")), None)
            .unwrap();

        let unassigned = store.unassigned();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].reference.as_str(), "HAZJNB0001");

        let assigned = store.assigned();
        assert_eq!(assigned.len(), 1);
        assert_eq!(assigned[0].reference.as_str(), "HAZJNB0002");
    }

    #[test]
    fn driver_feeds_filter_by_code_and_status() {
        let store = ShipmentStore::new();
        store.insert_new(record("HAZJNB0001")).unwrap();
        store.insert_new(record("HAZJNB0002")).unwrap();
        store
            .assign("HAZJNB0001", Some(driver("DRIVER001")), None)
            .unwrap();
        store
            .assign("HAZJNB0002", Some(driver("DRIVER001")), None)
            .unwrap();
        store
            .apply_scan("HAZJNB0002", ScanStage::Collection, None)
            .unwrap();

        assert_eq!(store.driver_jobs("DRIVER001").len(), 2);
        assert_eq!(store.driver_deliveries("DRIVER001").len(), 1);
        assert!(store.driver_jobs("DRIVER002").is_empty());
    }

    #[test]
    fn completed_log_rejects_duplicate() {
        let log = CompletedLog::new();
        let completed = CompletedRecord {
            reference: ShipmentRef::new("HAZJNB0001").unwrap(),
            secondary_ref: None,
            operator: "OPS-PETE".to_string(),
            company: "Acme".to_string(),
            signed_by: "T. Ndlovu".to_string(),
            delivered_at: Utc::now(),
            pod_path: "pods/POD_HAZJNB0001.html".to_string(),
            document_path: None,
        };
        log.append(completed.clone()).unwrap();
        assert!(log.append(completed).is_err());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn thread_anchor_updates_in_place() {
        let store = ShipmentStore::new();
        store.insert_new(record("HAZJNB0001")).unwrap();
        store.set_thread_anchor("HAZJNB0001", "msg-1".to_string());
        store.set_thread_anchor("HAZJNB0001", "msg-2".to_string());
        assert_eq!(
            store.get("HAZJNB0001").unwrap().thread_anchor.as_deref(),
            Some("msg-2")
        );
    }
}
