//! # Donation Types
//!
//! The checkout contract between the page and the checkout endpoint,
//! and the types that flow between the endpoint and a payment provider.

use crate::config::DonationConfig;
use crate::error::{DonationError, DonationResult};
use crate::money::{Currency, Price};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Body of a checkout request: `{quantity, name, message}`.
///
/// `quantity` is whatever number the donor typed; it is only bounded when
/// a [`Donation`] is built from it. Unparsable input is NaN, which JSON
/// carries as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    #[serde(deserialize_with = "quantity_or_nan")]
    pub quantity: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
}

fn quantity_or_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

impl CheckoutRequest {
    pub fn new(quantity: f64, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            quantity,
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Reply of the checkout endpoint: `{url}` on success, `{error}` on failure.
///
/// Both fields are optional on the wire; a reply carrying neither is
/// accepted and means "nothing to do".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckoutReply {
    pub fn redirect(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            error: None,
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            url: None,
            error: Some(error.into()),
        }
    }

    /// Redirect target, ignoring empty strings
    pub fn redirect_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    /// Rejection message, ignoring empty strings
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref().filter(|err| !err.is_empty())
    }
}

/// A validated donation, ready to be charged
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Donation {
    /// Unique donation ID (generated)
    pub id: String,

    /// Number of units, within `1..=max_quantity`
    pub quantity: u32,

    /// Price of one unit
    pub unit_price: Price,

    /// Line item name (e.g. "Coffee")
    pub product_name: String,

    /// Donor name, may be empty
    pub name: String,

    /// Donor message, may be empty
    pub message: String,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Donation {
    /// Build a donation from a checkout request.
    ///
    /// The quantity must be a finite whole number in `1..=max_quantity`.
    pub fn from_request(request: &CheckoutRequest, config: &DonationConfig) -> DonationResult<Self> {
        let quantity = validate_quantity(request.quantity, config.max_quantity())?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            quantity,
            unit_price: config.unit_price(),
            product_name: config.product_name.clone(),
            name: request.name.trim().to_string(),
            message: request.message.trim().to_string(),
            created_at: Utc::now(),
        })
    }

    /// Total charged for this donation
    pub fn total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }

    /// Metadata to attach to the provider session so the completed
    /// checkout can be turned back into a donation record
    pub fn metadata(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("donation_id", self.id.as_str()),
            ("name", self.name.as_str()),
            ("message", self.message.as_str()),
        ]
    }
}

fn validate_quantity(quantity: f64, max: u32) -> DonationResult<u32> {
    let in_range = quantity.is_finite()
        && quantity.fract() == 0.0
        && quantity >= 1.0
        && quantity <= f64::from(max);

    if !in_range {
        return Err(DonationError::InvalidQuantity { quantity, max });
    }
    Ok(quantity as u32)
}

/// Where the provider sends the donor after paying or cancelling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutUrls {
    pub success_url: String,
    pub cancel_url: String,
}

impl CheckoutUrls {
    /// Thank-you page on success, back to the storefront on cancel
    pub fn for_base(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            success_url: format!("{}/thank-you", base),
            cancel_url: format!("{}/", base),
        }
    }
}

/// A checkout session created by a payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub session_id: String,

    /// Our donation ID
    pub donation_id: String,

    /// Provider name (e.g., "stripe")
    pub provider: String,

    /// URL to redirect the donor to for payment
    pub checkout_url: String,

    /// When the session expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl CheckoutSession {
    pub fn new(
        session_id: impl Into<String>,
        donation_id: impl Into<String>,
        provider: impl Into<String>,
        checkout_url: impl Into<String>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            donation_id: donation_id.into(),
            provider: provider.into(),
            checkout_url: checkout_url.into(),
            expires_at: None,
            created_at: Utc::now(),
        }
    }
}

/// Webhook event kinds the storefront reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventKind {
    /// Checkout session completed
    CheckoutCompleted,
    /// Checkout session expired without payment
    CheckoutExpired,
    /// Anything else (passthrough)
    Unknown(String),
}

/// A verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider
    pub event_id: String,

    pub kind: WebhookEventKind,

    /// Provider name
    pub provider: String,

    /// Related session ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Amount paid (in smallest unit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,

    /// Provider payment status (e.g. "paid")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,

    /// Session metadata (donor name, message, donation id)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,

    /// Raw event object (for debugging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,

    pub timestamp: DateTime<Utc>,
}

impl WebhookEvent {
    /// True for a completed checkout whose payment went through
    pub fn is_paid_checkout(&self) -> bool {
        self.kind == WebhookEventKind::CheckoutCompleted
            && self.payment_status.as_deref() == Some("paid")
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DonationConfig {
        DonationConfig::new(500, 10_000)
    }

    #[test]
    fn test_donation_from_request() {
        let request = CheckoutRequest::new(3.0, " Ana ", "nice");
        let donation = Donation::from_request(&request, &config()).unwrap();

        assert_eq!(donation.quantity, 3);
        assert_eq!(donation.name, "Ana");
        assert_eq!(donation.total().amount, 1500);
        assert_eq!(donation.product_name, "Coffee");
        assert!(!donation.id.is_empty());
    }

    #[test]
    fn test_quantity_bounds() {
        let config = config();
        for bad in [0.0, -1.0, 21.0, 2.5, f64::NAN, f64::INFINITY] {
            let request = CheckoutRequest::new(bad, "", "");
            assert!(
                matches!(
                    Donation::from_request(&request, &config),
                    Err(DonationError::InvalidQuantity { max: 20, .. })
                ),
                "quantity {} should be rejected",
                bad
            );
        }
        for good in [1.0, 5.0, 20.0] {
            let request = CheckoutRequest::new(good, "", "");
            assert!(Donation::from_request(&request, &config).is_ok());
        }
    }

    #[test]
    fn test_metadata() {
        let donation =
            Donation::from_request(&CheckoutRequest::new(1.0, "Ana", "hi"), &config()).unwrap();
        let metadata = donation.metadata();

        assert!(metadata.contains(&("name", "Ana")));
        assert!(metadata.contains(&("message", "hi")));
        assert!(metadata.iter().any(|(k, v)| *k == "donation_id" && *v == donation.id));
    }

    #[test]
    fn test_checkout_request_defaults() {
        let request: CheckoutRequest = serde_json::from_str(r#"{"quantity": 2}"#).unwrap();
        assert_eq!(request.quantity, 2.0);
        assert_eq!(request.name, "");
        assert_eq!(request.message, "");
    }

    #[test]
    fn test_unparsable_quantity_reaches_validation() {
        let body = serde_json::to_string(&CheckoutRequest::new(f64::NAN, "Ana", "")).unwrap();
        assert!(body.contains(r#""quantity":null"#));

        let request: CheckoutRequest = serde_json::from_str(&body).unwrap();
        assert!(request.quantity.is_nan());
        assert!(matches!(
            Donation::from_request(&request, &config()),
            Err(DonationError::InvalidQuantity { max: 20, .. })
        ));
    }

    #[test]
    fn test_checkout_reply_wire_format() {
        let reply: CheckoutReply = serde_json::from_str(r#"{"url":"https://pay.example/abc"}"#).unwrap();
        assert_eq!(reply.redirect_url(), Some("https://pay.example/abc"));
        assert_eq!(reply.error_message(), None);

        let reply: CheckoutReply = serde_json::from_str("{}").unwrap();
        assert_eq!(reply, CheckoutReply::default());

        assert_eq!(
            serde_json::to_string(&CheckoutReply::rejected("card declined")).unwrap(),
            r#"{"error":"card declined"}"#
        );
        assert_eq!(CheckoutReply::redirect("").redirect_url(), None);
    }

    #[test]
    fn test_checkout_urls() {
        let urls = CheckoutUrls::for_base("https://coffee.example/");
        assert_eq!(urls.success_url, "https://coffee.example/thank-you");
        assert_eq!(urls.cancel_url, "https://coffee.example/");
    }
}
