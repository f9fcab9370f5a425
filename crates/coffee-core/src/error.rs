//! # Donation Error Types
//!
//! Typed error handling for the coffee-cart storefront.
//! All library operations return `Result<T, DonationError>`.

use thiserror::Error;

/// Core error type for checkout, records and configuration operations
#[derive(Debug, Error)]
pub enum DonationError {
    /// Configuration errors (missing keys, invalid prices)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Quantity outside `1..=max`, or not a whole number
    #[error("Quantity must be a whole number between 1 and {max}, got {quantity}")]
    InvalidQuantity { quantity: f64, max: u32 },

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Records store API error
    #[error("Store error [{store}]: {message}")]
    StoreError { store: String, message: String },

    /// Network/HTTP error communicating with a collaborator
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DonationError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            DonationError::Configuration(_) => 500,
            DonationError::InvalidRequest(_) => 400,
            DonationError::InvalidQuantity { .. } => 400,
            DonationError::ProviderError { .. } => 502,
            DonationError::StoreError { .. } => 502,
            DonationError::NetworkError(_) => 503,
            DonationError::WebhookVerificationFailed(_) => 401,
            DonationError::WebhookParseError(_) => 400,
            DonationError::Serialization(_) => 500,
            DonationError::Internal(_) => 500,
        }
    }

    /// Message suitable for showing a donor.
    ///
    /// Provider rejections are passed through verbatim; everything else
    /// keeps the full error text.
    pub fn public_message(&self) -> String {
        match self {
            DonationError::ProviderError { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for donation operations
pub type DonationResult<T> = Result<T, DonationError>;
