//! # Stripe Webhook Handling
//!
//! Signature verification and event parsing for Stripe webhooks.
//! A completed checkout is what turns into a donation record.

use chrono::{DateTime, Utc};
use coffee_core::{
    Currency, DonationError, DonationFields, DonationResult, WebhookEvent, WebhookEventKind,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use tracing::debug;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Events that should be enabled in the Stripe Dashboard
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    "checkout.session.completed",
    "checkout.session.expired",
];

// =============================================================================
// Signature Verification
// =============================================================================

struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> DonationResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        DonationError::WebhookVerificationFailed("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(DonationError::WebhookVerificationFailed(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn compute_hmac_sha256(secret: &str, message: &[u8]) -> DonationResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| DonationError::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn signed_payload(timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let mut signed = format!("{}.", timestamp).into_bytes();
    signed.extend_from_slice(payload);
    signed
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes().zip(b.bytes()).fold(0, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Check a `Stripe-Signature` header against the raw payload.
///
/// `now` is a unix timestamp; the signature must be within
/// [`SIGNATURE_TOLERANCE_SECS`] of it.
pub fn verify_signature(secret: &str, payload: &[u8], header: &str, now: i64) -> DonationResult<()> {
    let parts = parse_signature_header(header)?;

    if (now - parts.timestamp).abs() > SIGNATURE_TOLERANCE_SECS {
        return Err(DonationError::WebhookVerificationFailed(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let expected = compute_hmac_sha256(secret, &signed_payload(parts.timestamp, payload))?;

    if !parts
        .signatures
        .iter()
        .any(|sig| constant_time_compare(sig, &expected))
    {
        return Err(DonationError::WebhookVerificationFailed(
            "Signature mismatch".to_string(),
        ));
    }

    Ok(())
}

/// Build a `Stripe-Signature` header value for a payload.
/// Mirrors what Stripe sends; used by local tooling and tests.
pub fn sign_payload(secret: &str, payload: &[u8], timestamp: i64) -> DonationResult<String> {
    let signature = compute_hmac_sha256(secret, &signed_payload(timestamp, payload))?;
    Ok(format!("t={},v1={}", timestamp, signature))
}

// =============================================================================
// Event Parsing
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: i64,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Map<String, serde_json::Value>,
}

/// Parse a (verified) webhook payload into a [`WebhookEvent`]
pub fn parse_event(payload: &[u8]) -> DonationResult<WebhookEvent> {
    let event: StripeWebhookEvent = serde_json::from_slice(payload)
        .map_err(|e| DonationError::WebhookParseError(format!("Failed to parse webhook: {}", e)))?;

    debug!("Parsed Stripe webhook: type={}", event.event_type);

    let kind = match event.event_type.as_str() {
        "checkout.session.completed" => WebhookEventKind::CheckoutCompleted,
        "checkout.session.expired" => WebhookEventKind::CheckoutExpired,
        other => WebhookEventKind::Unknown(other.to_string()),
    };

    let object = event.data.object;

    let str_field = |key: &str| object.get(key).and_then(|v| v.as_str()).map(String::from);

    let metadata: HashMap<String, String> = object
        .get("metadata")
        .and_then(|m| m.as_object())
        .map(|m| {
            m.iter()
                .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                .collect()
        })
        .unwrap_or_default();

    Ok(WebhookEvent {
        event_id: event.id,
        kind,
        provider: "stripe".to_string(),
        session_id: str_field("id"),
        amount_paid: object.get("amount_total").and_then(|v| v.as_i64()),
        currency: str_field("currency").and_then(|c| Currency::from_code(&c)),
        payment_status: str_field("payment_status"),
        metadata,
        timestamp: DateTime::from_timestamp(event.created, 0).unwrap_or_else(Utc::now),
        raw_data: Some(serde_json::Value::Object(object)),
    })
}

/// Data of a `checkout.session.completed` event
#[derive(Debug, Clone)]
pub struct CheckoutCompletedData {
    pub session_id: String,
    pub donation_id: Option<String>,
    pub amount_total: i64,
    pub currency: Currency,
    pub payment_status: String,
    pub name: String,
    pub message: String,
}

impl CheckoutCompletedData {
    /// Extract from a webhook event
    pub fn from_event(event: &WebhookEvent) -> DonationResult<Self> {
        if event.kind != WebhookEventKind::CheckoutCompleted {
            return Err(DonationError::WebhookParseError(format!(
                "Not a completed checkout: {:?}",
                event.kind
            )));
        }

        let session_id = event
            .session_id
            .clone()
            .ok_or_else(|| DonationError::WebhookParseError("Missing session id".to_string()))?;

        let amount_total = event
            .amount_paid
            .ok_or_else(|| DonationError::WebhookParseError("Missing amount_total".to_string()))?;

        Ok(Self {
            session_id,
            donation_id: event.metadata_value("donation_id").map(String::from),
            amount_total,
            currency: event.currency.unwrap_or_default(),
            payment_status: event
                .payment_status
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            name: event.metadata_value("name").unwrap_or_default().to_string(),
            message: event.metadata_value("message").unwrap_or_default().to_string(),
        })
    }

    /// Check if payment was successful
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    /// Record fields for the records store; the amount is converted to
    /// whole currency units
    pub fn to_donation_fields(&self) -> DonationFields {
        DonationFields::new(
            self.name.clone(),
            self.currency.from_smallest_unit(self.amount_total),
            self.message.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SECRET: &str = "whsec_test";

    fn completed_payload() -> Vec<u8> {
        serde_json::to_vec(&json!({
            "id": "evt_test_1",
            "type": "checkout.session.completed",
            "created": 1_700_000_000,
            "data": {
                "object": {
                    "id": "cs_test_123",
                    "amount_total": 1500,
                    "currency": "usd",
                    "payment_status": "paid",
                    "metadata": {
                        "donation_id": "don_1",
                        "name": "Ana",
                        "message": "nice"
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_parse_signature_header() {
        let parsed = parse_signature_header("t=1234567890,v1=abc123,v1=def456,v0=zzz").unwrap();

        assert_eq!(parsed.timestamp, 1234567890);
        assert_eq!(parsed.signatures, ["abc123", "def456"]);

        assert!(parse_signature_header("v1=abc").is_err());
        assert!(parse_signature_header("t=123").is_err());
    }

    #[test]
    fn test_hmac_sha256() {
        let sig = compute_hmac_sha256(SECRET, b"1234567890.{}").unwrap();
        assert_eq!(sig.len(), 64);
    }

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("abc123", "abc123"));
        assert!(!constant_time_compare("abc123", "abc124"));
        assert!(!constant_time_compare("abc", "abcd"));
    }

    #[test]
    fn test_verify_signature_roundtrip() {
        let payload = completed_payload();
        let now = 1_700_000_100;
        let header = sign_payload(SECRET, &payload, now).unwrap();

        assert!(verify_signature(SECRET, &payload, &header, now).is_ok());
        assert!(verify_signature(SECRET, &payload, &header, now + 60).is_ok());
    }

    #[test]
    fn test_verify_signature_rejects_tampering() {
        let payload = completed_payload();
        let now = 1_700_000_100;
        let header = sign_payload(SECRET, &payload, now).unwrap();

        let mut tampered = payload.clone();
        tampered.push(b' ');
        assert!(matches!(
            verify_signature(SECRET, &tampered, &header, now),
            Err(DonationError::WebhookVerificationFailed(_))
        ));
        assert!(verify_signature("whsec_other", &payload, &header, now).is_err());
        assert!(verify_signature(SECRET, &payload, &header, now + SIGNATURE_TOLERANCE_SECS + 1).is_err());
    }

    #[test]
    fn test_parse_completed_event() {
        let event = parse_event(&completed_payload()).unwrap();

        assert_eq!(event.event_id, "evt_test_1");
        assert_eq!(event.kind, WebhookEventKind::CheckoutCompleted);
        assert_eq!(event.session_id.as_deref(), Some("cs_test_123"));
        assert_eq!(event.amount_paid, Some(1500));
        assert_eq!(event.currency, Some(Currency::USD));
        assert!(event.is_paid_checkout());
        assert_eq!(event.metadata_value("name"), Some("Ana"));
    }

    #[test]
    fn test_parse_unknown_event() {
        let payload = json!({
            "id": "evt_2",
            "type": "charge.refunded",
            "created": 1_700_000_000,
            "data": { "object": { "id": "ch_1" } }
        });
        let event = parse_event(payload.to_string().as_bytes()).unwrap();
        assert_eq!(event.kind, WebhookEventKind::Unknown("charge.refunded".to_string()));
        assert!(!event.is_paid_checkout());
    }

    #[test]
    fn test_checkout_completed_to_donation_fields() {
        let event = parse_event(&completed_payload()).unwrap();
        let data = CheckoutCompletedData::from_event(&event).unwrap();

        assert!(data.is_paid());
        assert_eq!(data.donation_id.as_deref(), Some("don_1"));

        let fields = data.to_donation_fields();
        assert_eq!(fields, DonationFields::new("Ana", 15.0, "nice"));
    }

    #[test]
    fn test_checkout_completed_rejects_other_events() {
        let payload = json!({
            "id": "evt_3",
            "type": "checkout.session.expired",
            "created": 1_700_000_000,
            "data": { "object": { "id": "cs_1" } }
        });
        let event = parse_event(payload.to_string().as_bytes()).unwrap();
        assert!(CheckoutCompletedData::from_event(&event).is_err());
    }
}
