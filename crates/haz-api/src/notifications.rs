//! # Notification Worker
//!
//! Lifecycle notifications are modeled as events emitted *after* a
//! successful state transition and consumed by a single background task, so
//! a slow or failing mail gateway never delays the caller-visible result of
//! a booking or scan confirmation.
//!
//! The single worker also serializes a shipment's notifications: the event
//! for step *k* is composed only after step *k−1*'s send finished and its
//! gateway message id was stored as the shipment's thread anchor, which is
//! what keeps every email replying to the latest message in the thread.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use haz_core::ShipmentKind;
use haz_geo::DeliveryEta;
use haz_notify::{send_threaded, templates, MailGateway};

use crate::state::ShipmentStore;

/// A lifecycle step that wants a client notification.
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// Booking accepted.
    Booked { reference: String },
    /// Collection scan confirmed.
    Collected { reference: String },
    /// Import collected at the airport, with the delivery-timing estimate.
    ImportCollected {
        reference: String,
        eta: DeliveryEta,
    },
    /// Delivery confirmed; the POD artifact rides along as attachment.
    Delivered {
        reference: String,
        pod_path: PathBuf,
    },
}

impl NotificationEvent {
    fn reference(&self) -> &str {
        match self {
            Self::Booked { reference }
            | Self::Collected { reference }
            | Self::ImportCollected { reference, .. }
            | Self::Delivered { reference, .. } => reference,
        }
    }
}

/// Handle route handlers use to emit events. Emission never fails loudly:
/// a disabled or shut-down worker logs at debug level and the business
/// operation proceeds.
#[derive(Clone)]
pub struct NotificationSender {
    tx: Option<mpsc::UnboundedSender<NotificationEvent>>,
}

impl NotificationSender {
    /// A sender with no worker behind it; events are dropped. Used when no
    /// mail gateway is configured and in most tests.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn new(tx: mpsc::UnboundedSender<NotificationEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    pub fn emit(&self, event: NotificationEvent) {
        match &self.tx {
            Some(tx) => {
                if tx.send(event).is_err() {
                    tracing::warn!("notification worker gone; event dropped");
                }
            }
            None => tracing::debug!("notifications disabled; event dropped"),
        }
    }
}

impl std::fmt::Debug for NotificationSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSender")
            .field("enabled", &self.tx.is_some())
            .finish()
    }
}

/// Spawn the worker task; returns the sender handle.
pub fn spawn_worker(
    gateway: Arc<dyn MailGateway>,
    store: Arc<ShipmentStore>,
    db_pool: Option<sqlx::PgPool>,
) -> NotificationSender {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_worker(gateway, store, db_pool, rx));
    NotificationSender::new(tx)
}

/// Consume events until every sender is dropped.
pub async fn run_worker(
    gateway: Arc<dyn MailGateway>,
    store: Arc<ShipmentStore>,
    db_pool: Option<sqlx::PgPool>,
    mut rx: mpsc::UnboundedReceiver<NotificationEvent>,
) {
    while let Some(event) = rx.recv().await {
        deliver(gateway.as_ref(), &store, db_pool.as_ref(), event).await;
    }
}

/// Compose and send one event's email, then persist the new thread anchor.
async fn deliver(
    gateway: &dyn MailGateway,
    store: &ShipmentStore,
    db_pool: Option<&sqlx::PgPool>,
    event: NotificationEvent,
) {
    let reference = event.reference().to_string();
    let Some(record) = store.get(&reference) else {
        tracing::warn!(%reference, "notification for unknown shipment; dropped");
        return;
    };

    let secondary = record.secondary_ref.as_deref();
    let (subject, body, attachment) = match &event {
        NotificationEvent::Booked { .. } => (
            templates::subject("Shipment", secondary, &reference),
            templates::booking_received(
                record.kind() == ShipmentKind::Import,
                record.kind() == ShipmentKind::Export,
                &record.operator,
            ),
            None,
        ),
        NotificationEvent::Collected { .. } => (
            templates::subject("Collection Update", secondary, &reference),
            templates::collected(&reference),
            None,
        ),
        NotificationEvent::ImportCollected { eta, .. } => (
            templates::subject("Import Update", secondary, &reference),
            templates::import_collected(&reference, eta.client_text()),
            None,
        ),
        NotificationEvent::Delivered { pod_path, .. } => (
            templates::subject("Delivery Update", secondary, &reference),
            templates::delivered(),
            Some(pod_path.clone()),
        ),
    };

    let message_id = send_threaded(
        gateway,
        &record.recipients,
        subject,
        body,
        attachment,
        record.thread_anchor.as_deref(),
    )
    .await;

    if let Some(id) = message_id {
        let updated = store.set_thread_anchor(&reference, id.clone());
        // Anchor is threading state on the shipment row; mirror it through.
        if let (Some(pool), Some(record)) = (db_pool, updated) {
            if let Err(e) = crate::db::shipments::update_after_mutation(pool, &record).await {
                tracing::warn!(%reference, error = %e, "thread anchor write-through failed");
            }
        }
        tracing::info!(%reference, message_id = %id, "notification sent and threaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ShipmentRecord;
    use async_trait::async_trait;
    use chrono::Utc;
    use haz_core::{Branch, Route, ShipmentRef};
    use haz_notify::{MailError, OutboundMail};
    use haz_state::ShipmentStatus;
    use std::sync::Mutex;

    /// Gateway double recording every send in order.
    #[derive(Default)]
    struct Recording {
        sent: Mutex<Vec<OutboundMail>>,
    }

    #[async_trait]
    impl MailGateway for Recording {
        async fn send(&self, mail: &OutboundMail) -> Result<Option<String>, MailError> {
            let mut sent = self.sent.lock().unwrap();
            sent.push(mail.clone());
            Ok(Some(format!("msg-{}", sent.len())))
        }
    }

    fn seeded_store() -> Arc<ShipmentStore> {
        let store = Arc::new(ShipmentStore::new());
        let now = Utc::now();
        store.hydrate(ShipmentRecord {
            reference: ShipmentRef::new("HAZJNB0001").unwrap(),
            secondary_ref: Some("HMJ055".to_string()),
            branch: Branch::Jnb,
            company: "Acme Chemicals".to_string(),
            operator: "OPS-PETE".to_string(),
            status: ShipmentStatus::Pending,
            route: Route::for_kind(
                haz_core::ShipmentKind::Local,
                Some(("Sandton".to_string(), None)),
                Some(("Midrand".to_string(), None)),
            )
            .unwrap(),
            driver: None,
            transporter: None,
            recipients: vec!["client@example.com".to_string()],
            thread_anchor: None,
            version: 0,
            created_at: now,
            updated_at: now,
        });
        store
    }

    #[tokio::test]
    async fn successive_events_thread_onto_latest_anchor() {
        let gateway = Arc::new(Recording::default());
        let store = seeded_store();

        for event in [
            NotificationEvent::Booked {
                reference: "HAZJNB0001".to_string(),
            },
            NotificationEvent::Collected {
                reference: "HAZJNB0001".to_string(),
            },
            NotificationEvent::Delivered {
                reference: "HAZJNB0001".to_string(),
                pod_path: PathBuf::from("/dev/null"),
            },
        ] {
            deliver(gateway.as_ref(), &store, None, event).await;
        }

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        // k-th notification replies to the id produced by k−1.
        assert_eq!(sent[0].in_reply_to, None);
        assert_eq!(sent[1].in_reply_to.as_deref(), Some("msg-1"));
        assert_eq!(sent[2].in_reply_to.as_deref(), Some("msg-2"));
        assert_eq!(
            store.get("HAZJNB0001").unwrap().thread_anchor.as_deref(),
            Some("msg-3")
        );
    }

    #[tokio::test]
    async fn subjects_follow_lifecycle_step() {
        let gateway = Arc::new(Recording::default());
        let store = seeded_store();

        deliver(
            gateway.as_ref(),
            &store,
            None,
            NotificationEvent::Collected {
                reference: "HAZJNB0001".to_string(),
            },
        )
        .await;

        let sent = gateway.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "Collection Update // (HMJ055 // HAZJNB0001)");
    }

    #[tokio::test]
    async fn unknown_reference_sends_nothing() {
        let gateway = Arc::new(Recording::default());
        let store = Arc::new(ShipmentStore::new());
        deliver(
            gateway.as_ref(),
            &store,
            None,
            NotificationEvent::Booked {
                reference: "HAZJNB9999".to_string(),
            },
        )
        .await;
        assert!(gateway.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn disabled_sender_drops_quietly() {
        NotificationSender::disabled().emit(NotificationEvent::Booked {
            reference: "HAZJNB0001".to_string(),
        });
    }
}
