//! # haz-state — Shipment Lifecycle State Machine
//!
//! The single source of transition legality for a shipment:
//!
//! ```text
//! Pending ──assign──▶ Assigned ──collection scan──▶ InProgress ──delivery scan──▶ Delivered
//!    │                   ▲ │
//!    └──collection scan──┘ └──assign (idempotent re-assign)
//! ```
//!
//! `Delivered` is terminal. Every transition is a pure function
//! `status × event → Result<status, LifecycleError>`; callers apply the
//! result under their own write lock, which is what makes duplicate or
//! out-of-order scans structurally impossible — the second scan observes the
//! advanced status and is rejected before any side effect runs.

pub mod lifecycle;

pub use lifecycle::{LifecycleError, ScanStage, ShipmentStatus};
