//! # Routes
//!
//! Axum router configuration for the storefront.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Page:
///   - GET  / - Storefront with the donation form and previous donations
///   - POST / - Form post (preset or donate)
///   - GET  /thank-you - Return page after payment
///
/// - API:
///   - POST /api/checkout - Create checkout session
///   - GET  /api/donations - List donation records
///
/// - Webhooks:
///   - POST /webhook/{provider} - Payment provider events
///
/// - GET /health - Health check
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/checkout", post(handlers::create_checkout))
        .route("/donations", get(handlers::list_donations))
        .layer(cors);

    let webhook_path = state.strategy.webhook_path();

    Router::new()
        .route("/", get(handlers::home).post(handlers::submit_form))
        .route("/thank-you", get(handlers::thank_you))
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        // Raw body, no CORS
        .route(&webhook_path, post(handlers::stripe_webhook))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
