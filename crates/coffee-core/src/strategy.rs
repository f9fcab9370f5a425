//! # Payment Strategy Trait
//!
//! Strategy trait for the payment provider that hosts the checkout page.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PaymentStrategy (trait)                  │
//! │  ├── create_checkout()                                      │
//! │  ├── verify_webhook()                                       │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴────────┐
//!                    │ StripeCheckout │
//!                    │    Strategy    │
//!                    └────────────────┘
//! ```

use crate::donation::{CheckoutSession, CheckoutUrls, Donation, WebhookEvent};
use crate::error::DonationResult;
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a checkout session for a donation.
    ///
    /// # Arguments
    /// * `donation` - The validated donation to charge
    /// * `urls` - Where to send the donor after paying or cancelling
    ///
    /// # Returns
    /// A `CheckoutSession` containing the redirect URL.
    async fn create_checkout(
        &self,
        donation: &Donation,
        urls: &CheckoutUrls,
    ) -> DonationResult<CheckoutSession>;

    /// Verify a webhook signature and parse the event.
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> DonationResult<WebhookEvent>;

    /// Get the provider name (for logging and routing).
    fn provider_name(&self) -> &'static str;

    /// Get the webhook endpoint path for this provider.
    /// Default: `/webhook/{provider_name}`
    fn webhook_path(&self) -> String {
        format!("/webhook/{}", self.provider_name())
    }
}

/// Type alias for a boxed payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;
