//! # coffee-core
//!
//! Core types and traits for the coffee-cart donation storefront.
//!
//! This crate provides:
//! - `DonationConfig` for the unit price and the donation ceiling
//! - `DonationForm` (the form controller) and the `CheckoutGateway` it submits through
//! - `CheckoutRequest` / `CheckoutReply`, the checkout endpoint contract
//! - `Donation`, `CheckoutSession` and `WebhookEvent` for the provider flow
//! - `PaymentStrategy` trait for the payment provider
//! - `DonationStore` trait and `DonationRecord` for past donations
//! - `DonationError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use coffee_core::{DonationConfig, DonationForm, SubmitOutcome};
//!
//! let config = DonationConfig::new(500, 10_000);
//! let mut form = DonationForm::new();
//! form.select_preset(3);
//! form.set_name("Ana");
//!
//! assert_eq!(form.support_amount_display(&config), "$15.00");
//!
//! match form.submit(&gateway).await {
//!     SubmitOutcome::Redirect(url) => { /* send the browser to url */ }
//!     _ => { /* re-render; form.error() holds anything to show */ }
//! }
//! ```

pub mod config;
pub mod donation;
pub mod error;
pub mod form;
pub mod money;
pub mod record;
pub mod store;
pub mod strategy;

// Re-exports for convenience
pub use config::DonationConfig;
pub use donation::{
    CheckoutReply, CheckoutRequest, CheckoutSession, CheckoutUrls, Donation, WebhookEvent,
    WebhookEventKind,
};
pub use error::{DonationError, DonationResult};
pub use form::{CheckoutGateway, DonationForm, SubmitOutcome, PRESETS, REQUEST_FAILED_MESSAGE};
pub use money::{Currency, Price};
pub use record::{DonationFields, DonationRecord};
pub use store::{BoxedDonationStore, DonationStore, InMemoryDonationStore};
pub use strategy::{BoxedPaymentStrategy, PaymentStrategy};
