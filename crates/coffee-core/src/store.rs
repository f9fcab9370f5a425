//! # Donation Store Trait
//!
//! The records store owns past donations. The storefront only lists
//! them for the page and appends one when a checkout completes.

use crate::error::{DonationError, DonationResult};
use crate::record::{DonationFields, DonationRecord};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Backing records store for donations
#[async_trait]
pub trait DonationStore: Send + Sync {
    /// All donation records, in the order the store returns them
    async fn list_donations(&self) -> DonationResult<Vec<DonationRecord>>;

    /// Append a donation record and return it as stored
    async fn record_donation(&self, fields: &DonationFields) -> DonationResult<DonationRecord>;

    /// Store name (for logging)
    fn store_name(&self) -> &'static str;
}

/// Type alias for a shared store (dynamic dispatch)
pub type BoxedDonationStore = Arc<dyn DonationStore>;

/// Process-local store for development and tests
#[derive(Debug, Default)]
pub struct InMemoryDonationStore {
    records: RwLock<Vec<DonationRecord>>,
}

impl InMemoryDonationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: seed with existing records
    pub fn with_records(records: Vec<DonationRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    fn poisoned() -> DonationError {
        DonationError::StoreError {
            store: "memory".to_string(),
            message: "lock poisoned".to_string(),
        }
    }
}

#[async_trait]
impl DonationStore for InMemoryDonationStore {
    async fn list_donations(&self) -> DonationResult<Vec<DonationRecord>> {
        let records = self.records.read().map_err(|_| Self::poisoned())?;
        Ok(records.clone())
    }

    async fn record_donation(&self, fields: &DonationFields) -> DonationResult<DonationRecord> {
        let record = DonationRecord::new(format!("rec{}", Uuid::new_v4().simple()), fields.clone());
        self.records
            .write()
            .map_err(|_| Self::poisoned())?
            .push(record.clone());
        Ok(record)
    }

    fn store_name(&self) -> &'static str {
        "memory"
    }
}
