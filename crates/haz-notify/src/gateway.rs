//! Mail gateway adapter trait and outbound message type.

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// An email ready to hand to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMail {
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
    /// File to attach (read and base64-encoded by the gateway).
    pub attachment: Option<PathBuf>,
    /// Message id of the previous email in this shipment's thread. The
    /// gateway sets both `In-Reply-To` and `References` to it so mail
    /// clients collapse the lifecycle into one visual thread.
    pub in_reply_to: Option<String>,
}

impl OutboundMail {
    pub fn new(to: Vec<String>, subject: impl Into<String>, html_body: impl Into<String>) -> Self {
        Self {
            to,
            subject: subject.into(),
            html_body: html_body.into(),
            attachment: None,
            in_reply_to: None,
        }
    }

    pub fn with_attachment(mut self, path: PathBuf) -> Self {
        self.attachment = Some(path);
        self
    }

    pub fn in_reply_to(mut self, message_id: Option<String>) -> Self {
        self.in_reply_to = message_id;
        self
    }
}

/// Errors from a gateway send. All of them are soft from the caller's
/// perspective — [`crate::thread::send_threaded`] logs and continues.
#[derive(Error, Debug)]
pub enum MailError {
    /// The request exceeded the configured timeout.
    #[error("mail gateway request timed out after {elapsed_secs}s")]
    Timeout { elapsed_secs: u64 },

    /// Transport failure or gateway-side error status.
    #[error("mail gateway unavailable: {reason}")]
    Unavailable { reason: String },

    /// The gateway rejected the message (bad recipients, payload too large).
    #[error("mail rejected by gateway: {reason}")]
    Rejected { reason: String },

    /// The attachment could not be read from disk.
    #[error("attachment unreadable: {0}")]
    Attachment(#[from] std::io::Error),
}

/// Sends email through an external gateway.
///
/// Returns the gateway-assigned message identifier when the response carries
/// one; `None` when the send succeeded but no identifier was exposed (the
/// thread anchor then simply stays put).
#[async_trait]
pub trait MailGateway: Send + Sync {
    async fn send(&self, mail: &OutboundMail) -> Result<Option<String>, MailError>;
}
