//! # Airtable Configuration
//!
//! Credentials and table location, loaded from environment variables.

use coffee_core::DonationError;
use std::env;

const AIRTABLE_API_BASE_URL: &str = "https://api.airtable.com";
const DEFAULT_TABLE_NAME: &str = "donations";

/// Airtable API configuration
#[derive(Debug, Clone)]
pub struct AirtableConfig {
    /// Personal access token (pat...)
    pub api_key: String,

    /// Base ID (app...)
    pub base_id: String,

    /// Table holding the donation records
    pub table_name: String,

    /// API base URL (for testing/mocking)
    pub api_base_url: String,
}

impl AirtableConfig {
    /// Load configuration from environment variables.
    ///
    /// Required env vars:
    /// - `AIRTABLE_API_KEY`
    /// - `AIRTABLE_BASE_ID`
    ///
    /// Optional: `AIRTABLE_TABLE_NAME` (default `donations`)
    pub fn from_env() -> Result<Self, DonationError> {
        dotenvy::dotenv().ok();

        let api_key = env::var("AIRTABLE_API_KEY")
            .map_err(|_| DonationError::Configuration("AIRTABLE_API_KEY not set".to_string()))?;

        let base_id = env::var("AIRTABLE_BASE_ID")
            .map_err(|_| DonationError::Configuration("AIRTABLE_BASE_ID not set".to_string()))?;

        let mut config = Self::new(api_key, base_id);
        if let Ok(table) = env::var("AIRTABLE_TABLE_NAME") {
            config.table_name = table;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn new(api_key: impl Into<String>, base_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_id: base_id.into(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            api_base_url: AIRTABLE_API_BASE_URL.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), DonationError> {
        if self.api_key.trim().is_empty() {
            return Err(DonationError::Configuration(
                "AIRTABLE_API_KEY must not be empty".to_string(),
            ));
        }
        if !self.base_id.starts_with("app") {
            return Err(DonationError::Configuration(
                "AIRTABLE_BASE_ID must start with app".to_string(),
            ));
        }
        if self.table_name.trim().is_empty() {
            return Err(DonationError::Configuration(
                "AIRTABLE_TABLE_NAME must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key)
    }

    /// Builder: set table name
    pub fn with_table_name(mut self, table: impl Into<String>) -> Self {
        self.table_name = table.into();
        self
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }
}
