//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API for donations.
//! The donor pays on Stripe's hosted page; we only create the session.

use crate::config::StripeConfig;
use crate::webhook;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coffee_core::{
    CheckoutSession, CheckoutUrls, Donation, DonationError, DonationResult, PaymentStrategy,
    WebhookEvent,
};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, error, info, instrument};

/// Stripe Checkout Session strategy
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> DonationResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| DonationError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> DonationResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    /// Form parameters for `POST /v1/checkout/sessions`: one line item
    /// priced inline, donor details as metadata
    fn build_form_params(donation: &Donation, urls: &CheckoutUrls) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("submit_type".to_string(), "donate".to_string()),
            ("success_url".to_string(), urls.success_url.clone()),
            ("cancel_url".to_string(), urls.cancel_url.clone()),
            (
                "line_items[0][price_data][currency]".to_string(),
                donation.unit_price.currency.as_str().to_string(),
            ),
            (
                "line_items[0][price_data][unit_amount]".to_string(),
                donation.unit_price.amount.to_string(),
            ),
            (
                "line_items[0][price_data][product_data][name]".to_string(),
                donation.product_name.clone(),
            ),
            (
                "line_items[0][quantity]".to_string(),
                donation.quantity.to_string(),
            ),
        ];

        for (key, value) in donation.metadata() {
            params.push((format!("metadata[{}]", key), value.to_string()));
        }

        params
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, donation, urls), fields(donation_id = %donation.id))]
    async fn create_checkout(
        &self,
        donation: &Donation,
        urls: &CheckoutUrls,
    ) -> DonationResult<CheckoutSession> {
        let form_params = Self::build_form_params(donation, urls);

        debug!(
            "Creating Stripe checkout session: quantity={}, total={}",
            donation.quantity,
            donation.total().display()
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| DonationError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DonationError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            let message = serde_json::from_str::<StripeErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));

            return Err(DonationError::ProviderError {
                provider: "stripe".to_string(),
                message,
            });
        }

        let session: StripeCheckoutSessionResponse = serde_json::from_str(&body).map_err(|e| {
            DonationError::Serialization(format!("Failed to parse Stripe response: {}", e))
        })?;

        info!("Created Stripe checkout session: id={}", session.id);

        Ok(CheckoutSession {
            session_id: session.id,
            donation_id: donation.id.clone(),
            provider: "stripe".to_string(),
            checkout_url: session.url,
            expires_at: session
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            created_at: Utc::now(),
        })
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> DonationResult<WebhookEvent> {
        webhook::verify_signature(
            &self.config.webhook_secret,
            payload,
            signature,
            Utc::now().timestamp(),
        )?;
        webhook::parse_event(payload)
    }

    fn provider_name(&self) -> &'static str {
        "stripe"
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    url: String,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffee_core::{CheckoutRequest, DonationConfig};
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn donation() -> Donation {
        let config = DonationConfig::new(500, 10_000);
        Donation::from_request(&CheckoutRequest::new(3.0, "Ana", "nice"), &config).unwrap()
    }

    fn strategy(server: &MockServer) -> StripeCheckoutStrategy {
        let config = StripeConfig::new("sk_test_abc", "whsec_test").with_api_base_url(server.uri());
        StripeCheckoutStrategy::new(config).unwrap()
    }

    #[test]
    fn test_build_form_params() {
        let donation = donation();
        let urls = CheckoutUrls::for_base("https://coffee.example");
        let params = StripeCheckoutStrategy::build_form_params(&donation, &urls);

        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("mode"), Some("payment"));
        assert_eq!(get("success_url"), Some("https://coffee.example/thank-you"));
        assert_eq!(get("cancel_url"), Some("https://coffee.example/"));
        assert_eq!(get("line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(get("line_items[0][price_data][unit_amount]"), Some("500"));
        assert_eq!(get("line_items[0][price_data][product_data][name]"), Some("Coffee"));
        assert_eq!(get("line_items[0][quantity]"), Some("3"));
        assert_eq!(get("metadata[name]"), Some("Ana"));
        assert_eq!(get("metadata[message]"), Some("nice"));
        assert_eq!(get("metadata[donation_id]"), Some(donation.id.as_str()));
    }

    #[tokio::test]
    async fn test_create_checkout_session() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test_abc"))
            .and(body_string_contains("line_items%5B0%5D%5Bquantity%5D=3"))
            .and(body_string_contains("metadata%5Bname%5D=Ana"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_1",
                "url": "https://checkout.stripe.com/c/pay/cs_test_1",
                "expires_at": 1_700_086_400
            })))
            .expect(1)
            .mount(&server)
            .await;

        let donation = donation();
        let session = strategy(&server)
            .create_checkout(&donation, &CheckoutUrls::for_base("https://coffee.example"))
            .await
            .unwrap();

        assert_eq!(session.session_id, "cs_test_1");
        assert_eq!(session.checkout_url, "https://checkout.stripe.com/c/pay/cs_test_1");
        assert_eq!(session.donation_id, donation.id);
        assert_eq!(session.provider, "stripe");
        assert!(session.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_create_checkout_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": { "message": "card declined", "type": "card_error" }
            })))
            .mount(&server)
            .await;

        let err = strategy(&server)
            .create_checkout(&donation(), &CheckoutUrls::for_base("https://coffee.example"))
            .await
            .unwrap_err();

        match err {
            DonationError::ProviderError { provider, message } => {
                assert_eq!(provider, "stripe");
                assert_eq!(message, "card declined");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_create_checkout_unparsable_error_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&server)
            .await;

        let err = strategy(&server)
            .create_checkout(&donation(), &CheckoutUrls::for_base("https://coffee.example"))
            .await
            .unwrap_err();

        assert!(err.public_message().contains("upstream exploded"));
    }

    #[tokio::test]
    async fn test_verify_webhook() {
        let server = MockServer::start().await;
        let strategy = strategy(&server);
        let payload = json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "created": 1_700_000_000,
            "data": { "object": { "id": "cs_1", "amount_total": 500, "currency": "usd", "payment_status": "paid" } }
        })
        .to_string();

        let header = webhook::sign_payload("whsec_test", payload.as_bytes(), Utc::now().timestamp()).unwrap();
        let event = strategy.verify_webhook(payload.as_bytes(), &header).await.unwrap();
        assert!(event.is_paid_checkout());

        assert!(strategy
            .verify_webhook(payload.as_bytes(), "t=1,v1=deadbeef")
            .await
            .is_err());
    }
}
