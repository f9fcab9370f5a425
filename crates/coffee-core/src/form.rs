//! # Donation Form Controller
//!
//! Local state of the donation form and what happens on submit.
//!
//! The form never validates the quantity itself; bounds are enforced by
//! the checkout endpoint, whose rejection comes back as an error string.

use crate::config::DonationConfig;
use crate::donation::{CheckoutReply, CheckoutRequest};
use crate::error::DonationResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Quantity shortcuts offered as buttons
pub const PRESETS: [u32; 3] = [1, 3, 5];

/// Shown when the checkout request itself fails (network, bad reply)
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed, please try again.";

/// Something that turns a checkout request into a checkout reply.
///
/// In the server this is the checkout service itself; in a browser it is
/// a `fetch` against `POST /api/checkout`, whose futures are not `Send`.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait CheckoutGateway {
    async fn request_checkout(&self, request: &CheckoutRequest) -> DonationResult<CheckoutReply>;
}

/// What the page should do after a submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Navigate the browser to the checkout URL
    Redirect(String),
    /// The endpoint rejected the checkout; the error is on the form
    Rejected(String),
    /// The reply carried neither a URL nor an error; nothing changes
    NoOp,
    /// The request never produced a usable reply; a generic error is on the form
    Failed,
}

/// Form state: quantity, donor name, message and the error line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationForm {
    quantity: f64,
    name: String,
    message: String,
    error: Option<String>,
}

impl Default for DonationForm {
    fn default() -> Self {
        Self {
            quantity: 1.0,
            name: String::new(),
            message: String::new(),
            error: None,
        }
    }
}

impl DonationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Accepts any number, including out-of-range ones
    pub fn set_quantity(&mut self, quantity: f64) {
        self.quantity = quantity;
    }

    /// Set quantity from raw input text; unparsable text becomes NaN
    pub fn set_quantity_input(&mut self, raw: &str) {
        self.quantity = raw.trim().parse().unwrap_or(f64::NAN);
    }

    /// Apply a preset button. Returns false for values that are not presets.
    pub fn select_preset(&mut self, preset: u32) -> bool {
        if !PRESETS.contains(&preset) {
            return false;
        }
        self.quantity = f64::from(preset);
        true
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Amount the current quantity supports, in currency units
    pub fn support_amount(&self, config: &DonationConfig) -> f64 {
        config.support_amount(self.quantity)
    }

    /// Formatted support amount (e.g. "$15.00")
    pub fn support_amount_display(&self, config: &DonationConfig) -> String {
        config.support_amount_display(self.quantity)
    }

    /// Request body for the current state
    pub fn checkout_request(&self) -> CheckoutRequest {
        CheckoutRequest::new(self.quantity, self.name.clone(), self.message.clone())
    }

    /// React to a checkout reply. `url` wins over `error`.
    pub fn apply_reply(&mut self, reply: &CheckoutReply) -> SubmitOutcome {
        if let Some(url) = reply.redirect_url() {
            return SubmitOutcome::Redirect(url.to_string());
        }
        if let Some(error) = reply.error_message() {
            self.error = Some(error.to_string());
            return SubmitOutcome::Rejected(error.to_string());
        }
        SubmitOutcome::NoOp
    }

    /// Clear the error, send the checkout request and react to the reply
    pub async fn submit<G>(&mut self, gateway: &G) -> SubmitOutcome
    where
        G: CheckoutGateway + ?Sized,
    {
        let request = self.begin_submit();
        let result = gateway.request_checkout(&request).await;
        self.finish_submit(result)
    }

    /// First half of `submit`: clear the error and snapshot the request.
    /// Edits made before `finish_submit` are kept.
    pub fn begin_submit(&mut self) -> CheckoutRequest {
        self.error = None;
        self.checkout_request()
    }

    /// Second half of `submit`: apply the gateway's result
    pub fn finish_submit(&mut self, result: DonationResult<CheckoutReply>) -> SubmitOutcome {
        match result {
            Ok(reply) => self.apply_reply(&reply),
            Err(_) => self.fail_request(),
        }
    }

    /// The request produced no usable reply; show the generic error
    pub fn fail_request(&mut self) -> SubmitOutcome {
        self.error = Some(REQUEST_FAILED_MESSAGE.to_string());
        SubmitOutcome::Failed
    }
}
