//! # haz-notify — Threaded Client Notifications
//!
//! Outbound email for shipment lifecycle updates, kept in one mail thread
//! per shipment:
//!
//! - [`gateway`]: the [`MailGateway`] adapter trait and outbound message
//!   type. A send may return the gateway's message identifier, which becomes
//!   the reply target ("thread anchor") of the next lifecycle email.
//! - [`sendgrid`]: HTTP gateway implementation with threading headers,
//!   base64 attachments, and a bounded timeout.
//! - [`templates`]: subjects and HTML bodies for each lifecycle step.
//! - [`thread`]: the best-effort send helper — no recipients is a no-op and
//!   a gateway failure is logged, never propagated, because notification is
//!   a side effect of a state transition, not a participant in it.

pub mod gateway;
pub mod sendgrid;
pub mod templates;
pub mod thread;

pub use gateway::{MailError, MailGateway, OutboundMail};
pub use sendgrid::{SendGridConfig, SendGridGateway};
pub use thread::send_threaded;
