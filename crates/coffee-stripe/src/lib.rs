//! # coffee-stripe
//!
//! Stripe payment strategy for coffee-cart.
//!
//! **StripeCheckoutStrategy** creates a Checkout Session with one line item
//! (`quantity` × unit price) and the donor's name and message as session
//! metadata, then hands back the hosted checkout URL.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use coffee_stripe::StripeCheckoutStrategy;
//! use coffee_core::{CheckoutUrls, PaymentStrategy};
//!
//! let strategy = StripeCheckoutStrategy::from_env()?;
//! let session = strategy
//!     .create_checkout(&donation, &CheckoutUrls::for_base("https://coffee.example"))
//!     .await?;
//!
//! // Redirect the donor to session.checkout_url
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use coffee_stripe::CheckoutCompletedData;
//!
//! let event = strategy.verify_webhook(payload, signature).await?;
//! if event.is_paid_checkout() {
//!     let data = CheckoutCompletedData::from_event(&event)?;
//!     store.record_donation(&data.to_donation_fields()).await?;
//! }
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
pub use webhook::{sign_payload, CheckoutCompletedData, REQUIRED_WEBHOOK_EVENTS};
