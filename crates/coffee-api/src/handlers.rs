//! # Request Handlers
//!
//! Axum request handlers for the storefront page, the checkout and
//! donation-list endpoints, and the Stripe webhook.

use crate::pages::{self, HomePage};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use coffee_core::{
    CheckoutReply, CheckoutRequest, DonationError, DonationForm, DonationRecord, SubmitOutcome,
    WebhookEventKind,
};
use coffee_stripe::CheckoutCompletedData;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn donation_error_to_response(err: DonationError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.public_message(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

/// Fields posted by the storefront form
#[derive(Debug, Deserialize)]
pub struct DonationFormPost {
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    /// Set when a preset button was pressed
    #[serde(default)]
    pub preset: Option<u32>,
    /// `donate` when the donate button was pressed
    #[serde(default)]
    pub action: Option<String>,
}

impl DonationFormPost {
    fn to_form(&self) -> DonationForm {
        let mut form = DonationForm::new();
        form.set_quantity_input(&self.quantity);
        form.set_name(self.name.clone());
        form.set_message(self.message.clone());
        form
    }

    fn is_donate(&self) -> bool {
        self.action.as_deref() == Some("donate") || self.preset.is_none()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "coffee-cart",
        "version": env!("CARGO_PKG_VERSION"),
        "provider": state.strategy.provider_name(),
        "store": state.store.store_name()
    }))
}

/// Create a checkout session: `{quantity, name, message}` -> `{url}`
#[instrument(skip(state, payload))]
pub async fn create_checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutReply>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected checkout body: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new(rejection.body_text(), 400)),
        )
    })?;

    let session = state
        .checkout_service()
        .create_session(&request)
        .await
        .map_err(donation_error_to_response)?;

    Ok(Json(CheckoutReply::redirect(session.checkout_url)))
}

/// Full donation list, in store order
#[instrument(skip(state))]
pub async fn list_donations(
    State(state): State<AppState>,
) -> Result<Json<Vec<DonationRecord>>, ApiError> {
    let records = state.store.list_donations().await.map_err(|e| {
        error!("Failed to list donations: {}", e);
        donation_error_to_response(e)
    })?;

    debug!("Listing {} donations", records.len());
    Ok(Json(records))
}

/// Storefront page with a fresh form
pub async fn home(State(state): State<AppState>) -> Html<String> {
    render_home(&state, &DonationForm::new()).await
}

/// Form post: apply a preset, or submit the donation
#[instrument(skip(state, post), fields(preset = ?post.preset))]
pub async fn submit_form(State(state): State<AppState>, Form(post): Form<DonationFormPost>) -> Response {
    let mut form = post.to_form();

    if !post.is_donate() {
        if let Some(preset) = post.preset {
            if !form.select_preset(preset) {
                warn!("Ignoring unknown preset: {}", preset);
            }
        }
        return render_home(&state, &form).await.into_response();
    }

    match form.submit(&state.checkout_service()).await {
        SubmitOutcome::Redirect(url) => Redirect::to(&url).into_response(),
        SubmitOutcome::Rejected(_) | SubmitOutcome::Failed | SubmitOutcome::NoOp => {
            render_home(&state, &form).await.into_response()
        }
    }
}

/// Thank-you page
pub async fn thank_you() -> Html<String> {
    Html(pages::render_thank_you())
}

/// Handle Stripe webhook
#[instrument(skip(state, headers, body))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("Missing Stripe-Signature header", 400)),
            )
        })?;

    let event = state
        .strategy
        .verify_webhook(&body, signature)
        .await
        .map_err(|e| {
            error!("Webhook verification failed: {}", e);
            donation_error_to_response(e)
        })?;

    info!("Received webhook: kind={:?}, id={}", event.kind, event.event_id);

    match &event.kind {
        WebhookEventKind::CheckoutCompleted => {
            let data = CheckoutCompletedData::from_event(&event).map_err(|e| {
                error!("Malformed checkout event: {}", e);
                donation_error_to_response(e)
            })?;

            if !data.is_paid() {
                info!(
                    "Checkout {} completed without payment (status={})",
                    data.session_id, data.payment_status
                );
                return Ok(StatusCode::OK);
            }

            // A store failure answers non-2xx so the provider retries delivery.
            let record = state
                .store
                .record_donation(&data.to_donation_fields())
                .await
                .map_err(|e| {
                    error!("Failed to record donation for {}: {}", data.session_id, e);
                    donation_error_to_response(e)
                })?;

            info!(
                "Donation recorded: record={}, session={}, donation={:?}",
                record.id, data.session_id, data.donation_id
            );
        }
        WebhookEventKind::CheckoutExpired => {
            info!("Checkout expired: session={:?}", event.session_id);
        }
        WebhookEventKind::Unknown(kind) => {
            debug!("Ignoring webhook event: {}", kind);
        }
    }

    Ok(StatusCode::OK)
}

// =============================================================================
// Helpers
// =============================================================================

/// Render the storefront; a failing store shows an empty list
async fn render_home(state: &AppState, form: &DonationForm) -> Html<String> {
    let donations = match state.store.list_donations().await {
        Ok(records) => records,
        Err(e) => {
            warn!("Donation list unavailable, rendering without it: {}", e);
            Vec::new()
        }
    };

    Html(
        HomePage {
            config: &state.donation,
            form,
            donations: &donations,
        }
        .render(),
    )
}
