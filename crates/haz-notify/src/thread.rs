//! # Best-Effort Threaded Send
//!
//! The one call sites use. Notification is a side effect of an already
//! committed state transition: an empty recipient list is a quiet no-op and
//! a gateway failure is logged and swallowed. The caller only learns the new
//! thread anchor, if any.

use crate::gateway::{MailGateway, OutboundMail};

/// Send a lifecycle email, threading it onto `anchor` when present.
///
/// Returns the gateway's message id for the sent mail so the caller can
/// store it as the shipment's new thread anchor. Returns `None` when there
/// were no recipients, the gateway failed, or no id was exposed — in every
/// case the caller proceeds.
pub async fn send_threaded(
    gateway: &dyn MailGateway,
    recipients: &[String],
    subject: String,
    html_body: String,
    attachment: Option<std::path::PathBuf>,
    anchor: Option<&str>,
) -> Option<String> {
    if recipients.is_empty() {
        return None;
    }

    let mut mail = OutboundMail::new(recipients.to_vec(), subject, html_body)
        .in_reply_to(anchor.map(String::from));
    if let Some(path) = attachment {
        mail = mail.with_attachment(path);
    }

    match gateway.send(&mail).await {
        Ok(message_id) => message_id,
        Err(e) => {
            tracing::warn!(subject = %mail.subject, error = %e, "notification send failed; continuing");
            None
        }
    }
}
