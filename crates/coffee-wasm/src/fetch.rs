//! Browser transport: `fetch` for the checkout request, `window.location`
//! for the redirect.

use async_trait::async_trait;
use coffee_core::{CheckoutGateway, CheckoutReply, CheckoutRequest, DonationError, DonationResult};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, RequestInit, Response};

/// Posts checkout requests to an endpoint with `fetch`
pub struct FetchGateway {
    endpoint: String,
}

impl FetchGateway {
    pub fn new(endpoint: String) -> Self {
        Self { endpoint }
    }
}

fn js_error(value: JsValue) -> DonationError {
    DonationError::NetworkError(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn window() -> DonationResult<web_sys::Window> {
    web_sys::window().ok_or_else(|| DonationError::Internal("no window".to_string()))
}

#[async_trait(?Send)]
impl CheckoutGateway for FetchGateway {
    async fn request_checkout(&self, request: &CheckoutRequest) -> DonationResult<CheckoutReply> {
        let body = serde_json::to_string(request)
            .map_err(|e| DonationError::Serialization(e.to_string()))?;

        let headers = Headers::new().map_err(js_error)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(js_error)?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body));

        let response: Response = JsFuture::from(window()?.fetch_with_str_and_init(&self.endpoint, &init))
            .await
            .map_err(js_error)?
            .dyn_into()
            .map_err(js_error)?;

        // Rejections arrive as non-2xx with an `{error}` body, so the status is not checked.
        let text = JsFuture::from(response.text().map_err(js_error)?)
            .await
            .map_err(js_error)?
            .as_string()
            .ok_or_else(|| DonationError::Serialization("reply body is not text".to_string()))?;

        serde_json::from_str(&text).map_err(|e| DonationError::Serialization(e.to_string()))
    }
}

/// Send the browser to `url`
pub fn navigate(url: &str) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    window.location().set_href(url)
}
