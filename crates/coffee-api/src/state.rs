//! # Application State
//!
//! Shared state for the Axum application: server settings, pricing,
//! the payment strategy and the donation records store.

use crate::checkout::CheckoutService;
use anyhow::Context;
use coffee_airtable::AirtableDonationStore;
use coffee_core::{
    BoxedDonationStore, BoxedPaymentStrategy, CheckoutUrls, Currency, DonationConfig,
    InMemoryDonationStore,
};
use coffee_stripe::StripeCheckoutStrategy;
use std::sync::Arc;

/// Which records store backs the donation list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Airtable,
    Memory,
}

impl StoreBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "airtable" => Some(StoreBackend::Airtable),
            "memory" => Some(StoreBackend::Memory),
            _ => None,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, used for the provider's return URLs
    pub base_url: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Records store backend
    pub store: StoreBackend,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            store: std::env::var("STORE")
                .ok()
                .and_then(|s| StoreBackend::parse(&s))
                .unwrap_or(StoreBackend::Airtable),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Unit price and donation ceiling
    pub donation: Arc<DonationConfig>,
    /// Payment provider
    pub strategy: BoxedPaymentStrategy,
    /// Donation records
    pub store: BoxedDonationStore,
    /// Provider return URLs
    pub urls: CheckoutUrls,
}

impl AppState {
    /// Build state from the environment: Stripe plus the configured store
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let donation = load_donation_config()?;

        let strategy = StripeCheckoutStrategy::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        let store: BoxedDonationStore = match config.store {
            StoreBackend::Airtable => Arc::new(
                AirtableDonationStore::from_env()
                    .map_err(|e| anyhow::anyhow!("Failed to initialize Airtable: {}", e))?,
            ),
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory donation store; records are lost on restart");
                Arc::new(InMemoryDonationStore::new())
            }
        };

        Ok(Self::from_parts(config, donation, Arc::new(strategy), store))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        config: AppConfig,
        donation: DonationConfig,
        strategy: BoxedPaymentStrategy,
        store: BoxedDonationStore,
    ) -> Self {
        let urls = CheckoutUrls::for_base(&config.base_url);
        Self {
            config,
            donation: Arc::new(donation),
            strategy,
            store,
            urls,
        }
    }

    /// Checkout service bound to this state's pricing and provider
    pub fn checkout_service(&self) -> CheckoutService {
        CheckoutService::new(self.donation.clone(), self.strategy.clone(), self.urls.clone())
    }
}

/// Load pricing from `config/donation.toml` (if present), then apply
/// environment overrides
fn load_donation_config() -> anyhow::Result<DonationConfig> {
    let config_paths = [
        "config/donation.toml",
        "../config/donation.toml",
        "../../config/donation.toml",
    ];

    let mut donation = DonationConfig::default();
    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            donation = DonationConfig::from_toml(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded donation config from {}", path);
            break;
        }
    }

    let donation = apply_env_overrides(donation, |key| std::env::var(key).ok())?;
    donation
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid donation config: {}", e))?;
    Ok(donation)
}

/// Apply `DONATION_IN_CENTS`, `MAX_DONATION_IN_CENTS` and `DONATION_CURRENCY`
fn apply_env_overrides<F>(mut donation: DonationConfig, lookup: F) -> anyhow::Result<DonationConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup("DONATION_IN_CENTS") {
        donation.donation_in_cents = value
            .trim()
            .parse()
            .with_context(|| format!("DONATION_IN_CENTS is not an integer: {}", value))?;
    }
    if let Some(value) = lookup("MAX_DONATION_IN_CENTS") {
        donation.max_donation_in_cents = value
            .trim()
            .parse()
            .with_context(|| format!("MAX_DONATION_IN_CENTS is not an integer: {}", value))?;
    }
    if let Some(value) = lookup("DONATION_CURRENCY") {
        donation.currency = Currency::from_code(value.trim())
            .ok_or_else(|| anyhow::anyhow!("Unsupported DONATION_CURRENCY: {}", value))?;
    }
    Ok(donation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            environment: "test".to_string(),
            store: StoreBackend::Memory,
        };

        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
        assert!(!config.is_production());
    }

    #[test]
    fn test_store_backend_parse() {
        assert_eq!(StoreBackend::parse("Airtable"), Some(StoreBackend::Airtable));
        assert_eq!(StoreBackend::parse("memory"), Some(StoreBackend::Memory));
        assert_eq!(StoreBackend::parse("postgres"), None);
    }

    #[test]
    fn test_env_overrides() {
        let donation = apply_env_overrides(
            DonationConfig::default(),
            lookup_from(&[
                ("DONATION_IN_CENTS", "300"),
                ("MAX_DONATION_IN_CENTS", "3000"),
                ("DONATION_CURRENCY", "eur"),
            ]),
        )
        .unwrap();

        assert_eq!(donation.donation_in_cents, 300);
        assert_eq!(donation.max_quantity(), 10);
        assert_eq!(donation.currency, Currency::EUR);
    }

    #[test]
    fn test_env_overrides_reject_garbage() {
        assert!(apply_env_overrides(
            DonationConfig::default(),
            lookup_from(&[("DONATION_IN_CENTS", "five")])
        )
        .is_err());
        assert!(apply_env_overrides(
            DonationConfig::default(),
            lookup_from(&[("DONATION_CURRENCY", "doge")])
        )
        .is_err());
    }

    #[test]
    fn test_no_overrides_keeps_defaults() {
        let donation = apply_env_overrides(DonationConfig::default(), lookup_from(&[])).unwrap();
        assert_eq!(donation, DonationConfig::default());
    }
}
