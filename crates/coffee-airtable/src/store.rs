//! # Airtable Donation Store
//!
//! Lists and appends donation records through the Airtable REST API.
//! Airtable pages list results; `list_donations` follows the `offset`
//! cursor so callers always get the full list.

use crate::config::AirtableConfig;
use async_trait::async_trait;
use coffee_core::{DonationError, DonationFields, DonationRecord, DonationResult, DonationStore};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

/// Donation records kept in an Airtable table
pub struct AirtableDonationStore {
    config: AirtableConfig,
    client: Client,
}

impl AirtableDonationStore {
    pub fn new(config: AirtableConfig) -> DonationResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .map_err(|e| DonationError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> DonationResult<Self> {
        Self::new(AirtableConfig::from_env()?)
    }

    /// `{api}/v0/{base}/{table}`, with the table name percent-encoded
    fn table_url(&self) -> DonationResult<Url> {
        let mut url = Url::parse(&self.config.api_base_url)
            .map_err(|e| DonationError::Configuration(format!("Invalid Airtable URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| DonationError::Configuration("Airtable URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v0", self.config.base_id.as_str(), self.config.table_name.as_str()]);

        Ok(url)
    }

    fn store_error(message: impl Into<String>) -> DonationError {
        DonationError::StoreError {
            store: "airtable".to_string(),
            message: message.into(),
        }
    }

    /// Read a response body, turning non-2xx statuses into store errors
    async fn read_body(response: reqwest::Response) -> DonationResult<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DonationError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Airtable API error: status={}, body={}", status, body);
            return Err(Self::store_error(error_message(status, &body)));
        }

        Ok(body)
    }
}

/// Airtable reports errors either as `{"error": "NOT_FOUND"}` or as
/// `{"error": {"type": ..., "message": ...}}`
fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let error = parsed.as_ref().and_then(|v| v.get("error"));

    match error {
        Some(serde_json::Value::String(kind)) => kind.clone(),
        Some(obj) => obj
            .get("message")
            .or_else(|| obj.get("type"))
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| format!("HTTP {}", status)),
        None => format!("HTTP {}: {}", status, body),
    }
}

#[async_trait]
impl DonationStore for AirtableDonationStore {
    #[instrument(skip(self), fields(table = %self.config.table_name))]
    async fn list_donations(&self) -> DonationResult<Vec<DonationRecord>> {
        let url = self.table_url()?;
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .header("Authorization", self.config.auth_header());
            if let Some(ref cursor) = offset {
                request = request.query(&[("offset", cursor)]);
            }

            let response = request
                .send()
                .await
                .map_err(|e| DonationError::NetworkError(e.to_string()))?;
            let body = Self::read_body(response).await?;

            let page: ListRecordsResponse = serde_json::from_str(&body).map_err(|e| {
                DonationError::Serialization(format!("Failed to parse Airtable records: {}", e))
            })?;

            debug!("Fetched {} donation records", page.records.len());
            records.extend(page.records);

            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }

    #[instrument(skip(self, fields), fields(table = %self.config.table_name))]
    async fn record_donation(&self, fields: &DonationFields) -> DonationResult<DonationRecord> {
        let response = self
            .client
            .post(self.table_url()?)
            .header("Authorization", self.config.auth_header())
            .json(&CreateRecordRequest { fields })
            .send()
            .await
            .map_err(|e| DonationError::NetworkError(e.to_string()))?;
        let body = Self::read_body(response).await?;

        let record: DonationRecord = serde_json::from_str(&body).map_err(|e| {
            DonationError::Serialization(format!("Failed to parse Airtable record: {}", e))
        })?;

        info!("Recorded donation: id={}, amount={}", record.id, record.fields.amount);
        Ok(record)
    }

    fn store_name(&self) -> &'static str {
        "airtable"
    }
}

// =============================================================================
// Airtable API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ListRecordsResponse {
    records: Vec<DonationRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateRecordRequest<'a> {
    fields: &'a DonationFields,
}
