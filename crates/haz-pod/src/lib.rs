//! # haz-pod — Proof-of-Delivery Documents
//!
//! Renders a delivery confirmation into a self-contained HTML artifact:
//! signer, delivery date/time, condition, references, notes, and — when the
//! driver captured one — the receiver's signature image embedded as a
//! base64 data URI.
//!
//! ## Immutability
//!
//! Delivery is terminal, so a POD is written exactly once. Files are created
//! with `create_new`; a path collision is an error rather than an overwrite.
//! The filename carries the shipment reference and the delivery timestamp.
//!
//! ## Degradation
//!
//! A malformed signature payload must not cost the client their POD: the
//! image is skipped with a logged warning and the document is produced with
//! its textual fields.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Condition of the goods as recorded at handover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    Good,
    Bad,
}

impl Condition {
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::Good => "good condition",
            Condition::Bad => "bad condition",
        }
    }
}

/// Everything a POD records.
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub reference: String,
    /// Client-side reference, when the shipment carries one.
    pub secondary_ref: Option<String>,
    pub company: String,
    pub signed_by: String,
    pub delivered_at: DateTime<Utc>,
    pub condition: Option<Condition>,
    pub notes: Option<String>,
    /// Base64-encoded PNG/JPG of the receiver's signature.
    pub signature_b64: Option<String>,
}

/// Errors producing a POD artifact.
#[derive(Error, Debug)]
pub enum PodError {
    /// Output directory could not be created or the file written.
    #[error("failed to write POD document: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes POD artifacts under a fixed output directory.
#[derive(Debug, Clone)]
pub struct PodGenerator {
    output_dir: PathBuf,
}

impl PodGenerator {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Render and persist the POD, returning the artifact path.
    ///
    /// # Errors
    ///
    /// Only I/O failures error; a malformed signature image degrades to a
    /// document without the image.
    pub fn generate(&self, record: &DeliveryRecord) -> Result<PathBuf, PodError> {
        std::fs::create_dir_all(&self.output_dir)?;

        let filename = format!(
            "POD_{}_{}.html",
            sanitize(&record.reference),
            record.delivered_at.format("%Y%m%d_%H%M%S")
        );
        let path = self.output_dir.join(filename);

        let html = render(record);

        // create_new: a POD is never overwritten.
        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        let mut file = options.open(&path)?;
        std::io::Write::write_all(&mut file, html.as_bytes())?;

        Ok(path)
    }
}

/// Keep filenames portable: references come from operator input.
fn sanitize(reference: &str) -> String {
    reference
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn render(record: &DeliveryRecord) -> String {
    let date = record.delivered_at.format("%Y-%m-%d");
    let time = record.delivered_at.format("%H:%M");
    let condition_clause = record
        .condition
        .map(|c| format!(" in {}", c.as_str()))
        .unwrap_or_default();

    let mut body = format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Proof of Delivery — {reference}</title></head>\n<body>\n\
         <h1>Proof of Delivery</h1>\n\
         <p>Dear Customer, we are happy to let you know your shipment has been delivered to {signed_by} \
         on {date} at {time}{condition_clause}.</p>\n\
         <h2>Shipment Details</h2>\n\
         <table>\n\
         <tr><td>Reference</td><td>{reference}</td></tr>\n\
         <tr><td>Client Reference</td><td>{secondary}</td></tr>\n\
         <tr><td>Client</td><td>{company}</td></tr>\n\
         <tr><td>Notes</td><td>{notes}</td></tr>\n\
         </table>\n",
        reference = escape(&record.reference),
        signed_by = escape(&record.signed_by),
        secondary = escape(record.secondary_ref.as_deref().unwrap_or("—")),
        company = escape(&record.company),
        notes = escape(record.notes.as_deref().unwrap_or("—")),
    );

    if let Some(sig) = &record.signature_b64 {
        match base64::engine::general_purpose::STANDARD.decode(sig.trim()) {
            Ok(_) => {
                body.push_str(&format!(
                    "<h2>Receiver Signature</h2>\n<img src=\"data:image/png;base64,{}\" alt=\"Receiver signature\" style=\"max-width:300px\">\n",
                    sig.trim()
                ));
            }
            Err(e) => {
                tracing::warn!(reference = %record.reference, error = %e, "signature image malformed, omitting from POD");
            }
        }
    }

    body.push_str("</body>\n</html>\n");
    body
}

/// Minimal HTML escaping for operator-entered text fields.
fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
