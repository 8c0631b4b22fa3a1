//! # Lifecycle Email Templates
//!
//! Subjects and HTML bodies for each client-facing lifecycle update. The
//! subject always carries both references — `Prefix // (SECONDARY // REF)` —
//! because clients file correspondence by their own reference while drivers
//! and ops work from the waybill reference.

/// Subject line: `prefix // (secondary // reference)`. A missing secondary
/// reference renders as an em-dash placeholder, as on printed waybills.
pub fn subject(prefix: &str, secondary_ref: Option<&str>, reference: &str) -> String {
    format!(
        "{prefix} // ({} // {reference})",
        secondary_ref.unwrap_or("HMJ—")
    )
}

/// Booking-received body; wording differs per shipment kind.
pub fn booking_received(kind_is_import: bool, kind_is_export: bool, operator: &str) -> String {
    if kind_is_import {
        format!(
            "<p>Dear Customer,</p>\
             <p>Please note that our Operations team have received your import request, \
             {operator} is working on this and will be providing updates shortly.</p>"
        )
    } else if kind_is_export {
        format!(
            "<p>Dear Client,</p>\
             <p>We are pleased to inform you that your shipment has been received and is \
             being processed by {operator}. Updates will be shared shortly.</p>"
        )
    } else {
        "<p>Dear Client,</p>\
         <p>Your local shipment has been submitted and is being scheduled.</p>"
            .to_string()
    }
}

/// Collection-confirmed body.
pub fn collected(reference: &str) -> String {
    format!(
        "<p>Dear Client,</p>\
         <p>Your shipment {reference} has been collected and is en route.</p>"
    )
}

/// Import collection body with the delivery-timing estimate, e.g.
/// "will be delivered today".
pub fn import_collected(reference: &str, eta_text: &str) -> String {
    format!(
        "<p>Dear Customer,</p>\
         <p>Your import shipment {reference} has been collected at the airport and {eta_text}.</p>"
    )
}

/// Delivery-confirmed body; sent with the POD attached.
pub fn delivered() -> String {
    "<p>Dear Client,</p>\
     <p>We are pleased to inform you that the shipment has successfully been delivered. \
     Attached is a copy of the POD for your records.</p>\
     <p>Should you have any enquiries on your shipment, please do not hesitate to \
     contact us.</p>"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_carries_both_references() {
        let s = subject("Collection Update", Some("HMJ055"), "HAZJNB0042");
        assert_eq!(s, "Collection Update // (HMJ055 // HAZJNB0042)");
    }

    #[test]
    fn subject_placeholder_without_secondary() {
        let s = subject("Shipment", None, "HAZCPT0007");
        assert_eq!(s, "Shipment // (HMJ— // HAZCPT0007)");
    }

    #[test]
    fn booking_bodies_differ_per_kind() {
        let import = booking_received(true, false, "OPS-PETE");
        assert!(import.contains("import request"));
        assert!(import.contains("OPS-PETE"));

        let export = booking_received(false, true, "OPS-PETE");
        assert!(export.contains("being processed by OPS-PETE"));

        let local = booking_received(false, false, "OPS-PETE");
        assert!(local.contains("local shipment"));
    }

    #[test]
    fn import_collected_embeds_eta() {
        let body = import_collected("HAZJNB0042", "will be delivered today");
        assert!(body.contains("collected at the airport and will be delivered today."));
    }

    #[test]
    fn delivered_mentions_pod() {
        assert!(delivered().contains("copy of the POD"));
    }
}
