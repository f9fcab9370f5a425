//! # coffee-cart
//!
//! "Buy me a coffee" storefront.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export AIRTABLE_API_KEY=pat...
//! export AIRTABLE_BASE_ID=app...
//!
//! # Run the server
//! coffee-cart
//! ```

use coffee_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    print_banner();

    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!(
        "Donation: {} per coffee, up to {} coffees",
        state.donation.unit_price().display(),
        state.donation.max_quantity()
    );
    info!(
        "Payment provider: {}, donation store: {}",
        state.strategy.provider_name(),
        state.store.store_name()
    );

    let webhook_path = state.strategy.webhook_path();
    let app = routes::create_router(state);

    info!("☕ coffee-cart starting on http://{}", addr);

    if !is_prod {
        info!("🛒 Storefront: http://{}/", addr);
        info!("💳 Checkout: POST http://{}/api/checkout", addr);
        info!("🔔 Webhook: POST http://{}{}", addr, webhook_path);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// `RUST_LOG` filters (default INFO); `LOG_FORMAT=json` emits JSON lines
fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let (text_layer, json_layer) = if json {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(text_layer)
        .with(json_layer)
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}

fn print_banner() {
    println!(
        r#"
  ☕ coffee-cart ☕
  ━━━━━━━━━━━━━━━━━━
  Buy me a coffee
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
