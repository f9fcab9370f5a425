//! # Checkout Service
//!
//! Turns a checkout request into a provider session. Shared by the JSON
//! endpoint and the form post, which drives it through [`CheckoutGateway`].

use async_trait::async_trait;
use coffee_core::{
    BoxedPaymentStrategy, CheckoutGateway, CheckoutReply, CheckoutRequest, CheckoutSession,
    CheckoutUrls, Donation, DonationConfig, DonationResult,
};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Checkout bound to one pricing config and one provider
#[derive(Clone)]
pub struct CheckoutService {
    donation: Arc<DonationConfig>,
    strategy: BoxedPaymentStrategy,
    urls: CheckoutUrls,
}

impl CheckoutService {
    pub fn new(donation: Arc<DonationConfig>, strategy: BoxedPaymentStrategy, urls: CheckoutUrls) -> Self {
        Self {
            donation,
            strategy,
            urls,
        }
    }

    /// Validate the request and open a provider session for it
    #[instrument(skip(self, request), fields(quantity = request.quantity))]
    pub async fn create_session(&self, request: &CheckoutRequest) -> DonationResult<CheckoutSession> {
        let donation = Donation::from_request(request, &self.donation)?;

        info!(
            "Creating checkout: donation={}, quantity={}, total={}, provider={}",
            donation.id,
            donation.quantity,
            donation.total().display(),
            self.strategy.provider_name()
        );

        let session = self
            .strategy
            .create_checkout(&donation, &self.urls)
            .await
            .map_err(|e| {
                error!("Failed to create checkout: {}", e);
                e
            })?;

        info!("Created checkout session: {}", session.session_id);
        Ok(session)
    }
}

#[async_trait]
impl CheckoutGateway for CheckoutService {
    /// Rejections become `{error}` replies; the call itself never fails
    async fn request_checkout(&self, request: &CheckoutRequest) -> DonationResult<CheckoutReply> {
        Ok(match self.create_session(request).await {
            Ok(session) => CheckoutReply::redirect(session.checkout_url),
            Err(e) => CheckoutReply::rejected(e.public_message()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffee_core::{DonationError, DonationForm, PaymentStrategy, SubmitOutcome, WebhookEvent};

    struct EchoStrategy;

    #[async_trait]
    impl PaymentStrategy for EchoStrategy {
        async fn create_checkout(
            &self,
            donation: &Donation,
            urls: &CheckoutUrls,
        ) -> DonationResult<CheckoutSession> {
            if donation.name == "declined" {
                return Err(DonationError::ProviderError {
                    provider: "echo".to_string(),
                    message: "card declined".to_string(),
                });
            }
            assert_eq!(urls.success_url, "http://shop.test/thank-you");
            Ok(CheckoutSession::new(
                "cs_echo",
                donation.id.clone(),
                "echo",
                format!("https://pay.example/{}", donation.quantity),
            ))
        }

        async fn verify_webhook(&self, _payload: &[u8], _signature: &str) -> DonationResult<WebhookEvent> {
            Err(DonationError::Internal("not used".to_string()))
        }

        fn provider_name(&self) -> &'static str {
            "echo"
        }
    }

    fn service() -> CheckoutService {
        CheckoutService::new(
            Arc::new(DonationConfig::default()),
            Arc::new(EchoStrategy),
            CheckoutUrls::for_base("http://shop.test"),
        )
    }

    #[tokio::test]
    async fn test_create_session() {
        let session = service()
            .create_session(&CheckoutRequest::new(3.0, "Ana", "nice"))
            .await
            .unwrap();
        assert_eq!(session.checkout_url, "https://pay.example/3");
    }

    #[tokio::test]
    async fn test_create_session_rejects_out_of_range() {
        let err = service()
            .create_session(&CheckoutRequest::new(21.0, "", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, DonationError::InvalidQuantity { max: 20, .. }));
    }

    #[tokio::test]
    async fn test_form_submit_through_service() {
        let service = service();

        let mut form = DonationForm::new();
        form.select_preset(5);
        assert_eq!(
            form.submit(&service).await,
            SubmitOutcome::Redirect("https://pay.example/5".to_string())
        );

        form.set_name("declined");
        assert_eq!(
            form.submit(&service).await,
            SubmitOutcome::Rejected("card declined".to_string())
        );
        assert_eq!(form.error(), Some("card declined"));
    }
}
