//! # coffee-wasm
//!
//! WebAssembly bindings for the coffee-cart donation form.
//!
//! `DonationWidget` holds the same form state the server-rendered page
//! uses, so a page with scripts can keep it in the browser:
//! - preset buttons, quantity, name and message setters
//! - the live "Donate = $X.XX" amount
//! - submit via `fetch` to `POST /api/checkout`, then redirect
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { DonationWidget } from 'coffee-wasm';
//!
//! await init();
//!
//! const widget = new DonationWidget(500, 10000);
//! widget.select_preset(3);
//! widget.set_name('Ana');
//! console.log(widget.support_amount_display()); // "$15.00"
//!
//! const outcome = await widget.submit(); // "redirect" | "rejected" | "noop" | "failed"
//! if (outcome === 'rejected') showError(widget.error);
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

#[cfg(target_arch = "wasm32")]
mod fetch;

use coffee_core::{
    CheckoutReply, CheckoutRequest, Currency, DonationConfig, DonationError, DonationForm, Price,
    SubmitOutcome, PRESETS,
};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Default checkout endpoint, relative to the page
pub const CHECKOUT_ENDPOINT: &str = "/api/checkout";

/// Donation form state for the browser
#[wasm_bindgen]
pub struct DonationWidget {
    config: Rc<DonationConfig>,
    form: Rc<RefCell<DonationForm>>,
    endpoint: String,
}

impl DonationWidget {
    fn with_config(config: DonationConfig) -> Result<Self, String> {
        config.validate().map_err(|e| e.to_string())?;
        Ok(Self {
            config: Rc::new(config),
            form: Rc::new(RefCell::new(DonationForm::new())),
            endpoint: CHECKOUT_ENDPOINT.to_string(),
        })
    }

    fn body(&self) -> Result<String, String> {
        serde_json::to_string(&self.form.borrow().checkout_request()).map_err(|e| e.to_string())
    }

    /// Clear the error and snapshot the request to send
    #[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
    fn begin_request(&self) -> CheckoutRequest {
        self.form.borrow_mut().begin_submit()
    }

    /// Apply a raw reply body; a body that is not a reply counts as a failed request
    fn apply_reply_text(&self, reply: &str) -> SubmitOutcome {
        let result = serde_json::from_str::<CheckoutReply>(reply)
            .map_err(|e| DonationError::Serialization(e.to_string()));
        self.form.borrow_mut().finish_submit(result)
    }
}

#[wasm_bindgen]
impl DonationWidget {
    /// Create a widget for a unit price and donation ceiling, both in cents
    #[wasm_bindgen(constructor)]
    pub fn new(donation_in_cents: i64, max_donation_in_cents: i64) -> Result<DonationWidget, JsValue> {
        Self::with_config(DonationConfig::new(donation_in_cents, max_donation_in_cents))
            .map_err(|e| JsValue::from_str(&e))
    }

    #[wasm_bindgen(getter)]
    pub fn quantity(&self) -> f64 {
        self.form.borrow().quantity()
    }

    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.form.borrow().name().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn message(&self) -> String {
        self.form.borrow().message().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.form.borrow().error().map(String::from)
    }

    /// Upper bound for the quantity input
    #[wasm_bindgen(getter)]
    pub fn max_quantity(&self) -> u32 {
        self.config.max_quantity()
    }

    /// Preset button values
    pub fn presets() -> Vec<u32> {
        PRESETS.to_vec()
    }

    pub fn set_quantity(&mut self, quantity: f64) {
        self.form.borrow_mut().set_quantity(quantity);
    }

    /// Raw text of the quantity input
    pub fn set_quantity_input(&mut self, raw: &str) {
        self.form.borrow_mut().set_quantity_input(raw);
    }

    pub fn select_preset(&mut self, preset: u32) -> bool {
        self.form.borrow_mut().select_preset(preset)
    }

    pub fn set_name(&mut self, name: String) {
        self.form.borrow_mut().set_name(name);
    }

    pub fn set_message(&mut self, message: String) {
        self.form.borrow_mut().set_message(message);
    }

    #[wasm_bindgen(getter)]
    pub fn endpoint(&self) -> String {
        self.endpoint.clone()
    }

    /// Override the checkout endpoint (default `/api/checkout`)
    pub fn set_endpoint(&mut self, endpoint: String) {
        self.endpoint = endpoint;
    }

    pub fn support_amount(&self) -> f64 {
        self.form.borrow().support_amount(&self.config)
    }

    /// e.g. "$15.00"
    pub fn support_amount_display(&self) -> String {
        self.form.borrow().support_amount_display(&self.config)
    }

    /// JSON body for `POST /api/checkout`
    pub fn request_body(&self) -> Result<String, JsValue> {
        self.body().map_err(|e| JsValue::from_str(&e))
    }

    /// Apply a checkout reply body. Returns the URL to navigate to, if any.
    pub fn apply_reply(&self, reply: &str) -> Option<String> {
        match self.apply_reply_text(reply) {
            SubmitOutcome::Redirect(url) => Some(url),
            _ => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl DonationWidget {
    /// Send the checkout request and navigate on success.
    ///
    /// Resolves to `"redirect"`, `"rejected"`, `"noop"` or `"failed"`.
    pub fn submit(&self) -> js_sys::Promise {
        use coffee_core::CheckoutGateway;

        let form = self.form.clone();
        let gateway = fetch::FetchGateway::new(self.endpoint.clone());
        let request = self.begin_request();

        wasm_bindgen_futures::future_to_promise(async move {
            // No borrow is held across the fetch; setters keep working meanwhile.
            let result = gateway.request_checkout(&request).await;
            let outcome = form.borrow_mut().finish_submit(result);

            if let SubmitOutcome::Redirect(url) = &outcome {
                fetch::navigate(url)?;
            } else {
                log(&format!("Checkout {}", outcome_label(&outcome)));
            }
            Ok(JsValue::from_str(outcome_label(&outcome)))
        })
    }
}

/// Name of a submit outcome as seen from JavaScript
fn outcome_label(outcome: &SubmitOutcome) -> &'static str {
    match outcome {
        SubmitOutcome::Redirect(_) => "redirect",
        SubmitOutcome::Rejected(_) => "rejected",
        SubmitOutcome::NoOp => "noop",
        SubmitOutcome::Failed => "failed",
    }
}

/// Format an amount in cents for display
#[wasm_bindgen]
pub fn format_cents(cents: i64) -> String {
    Price::from_cents(cents, Currency::USD).display()
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> DonationWidget {
        DonationWidget::with_config(DonationConfig::new(500, 10_000)).unwrap()
    }

    #[test]
    fn test_rejects_unusable_config() {
        assert!(DonationWidget::with_config(DonationConfig::new(0, 10_000)).is_err());
    }

    #[test]
    fn test_presets_and_amount() {
        let mut widget = widget();
        assert_eq!(widget.support_amount_display(), "$5.00");
        assert_eq!(widget.max_quantity(), 20);

        for preset in DonationWidget::presets() {
            assert!(widget.select_preset(preset));
            assert_eq!(widget.quantity(), f64::from(preset));
        }
        assert_eq!(widget.support_amount(), 25.0);
        assert!(!widget.select_preset(4));
    }

    #[test]
    fn test_request_body() {
        let mut widget = widget();
        widget.set_quantity_input("3");
        widget.set_name("Ana".to_string());
        widget.set_message("nice".to_string());

        let body: serde_json::Value = serde_json::from_str(&widget.body().unwrap()).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "quantity": 3.0, "name": "Ana", "message": "nice" })
        );
    }

    #[test]
    fn test_apply_reply() {
        let widget = widget();

        assert_eq!(
            widget.apply_reply(r#"{"url":"https://pay.example/abc"}"#),
            Some("https://pay.example/abc".to_string())
        );
        assert_eq!(widget.error(), None);

        assert_eq!(widget.apply_reply(r#"{"error":"card declined"}"#), None);
        assert_eq!(widget.error(), Some("card declined".to_string()));
    }

    #[test]
    fn test_apply_empty_reply_changes_nothing() {
        let widget = widget();
        assert_eq!(widget.apply_reply_text("{}"), SubmitOutcome::NoOp);
        assert_eq!(widget.error(), None);
    }

    #[test]
    fn test_apply_garbage_reply_fails() {
        let widget = widget();
        assert_eq!(widget.apply_reply_text("<html>"), SubmitOutcome::Failed);
        assert_eq!(
            widget.error(),
            Some(coffee_core::REQUEST_FAILED_MESSAGE.to_string())
        );
    }

    #[test]
    fn test_edits_while_request_is_pending_are_kept() {
        let mut widget = widget();
        widget.set_name("Ana".to_string());
        widget.apply_reply(r#"{"error":"old"}"#);

        let request = widget.begin_request();
        assert_eq!(request.name, "Ana");
        assert_eq!(widget.error(), None);

        widget.set_name("Bo".to_string());
        widget.set_message("typed meanwhile".to_string());
        assert!(widget.select_preset(3));

        assert_eq!(
            widget.apply_reply_text(r#"{"error":"card declined"}"#),
            SubmitOutcome::Rejected("card declined".to_string())
        );
        assert_eq!(widget.name(), "Bo");
        assert_eq!(widget.message(), "typed meanwhile");
        assert_eq!(widget.quantity(), 3.0);
        assert_eq!(widget.error(), Some("card declined".to_string()));
    }

    #[test]
    fn test_outcome_labels() {
        assert_eq!(outcome_label(&SubmitOutcome::Redirect("x".into())), "redirect");
        assert_eq!(outcome_label(&SubmitOutcome::NoOp), "noop");
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(1999), "$19.99");
        assert_eq!(format_cents(100), "$1.00");
    }
}
