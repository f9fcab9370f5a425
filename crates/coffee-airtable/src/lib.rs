//! # coffee-airtable
//!
//! Airtable-backed [`DonationStore`](coffee_core::DonationStore) for coffee-cart.
//!
//! Records live in one table with `name` (text), `amount` (number) and
//! `message` (long text) columns.
//!
//! ```rust,ignore
//! use coffee_airtable::AirtableDonationStore;
//! use coffee_core::DonationStore;
//!
//! let store = AirtableDonationStore::from_env()?;
//! for record in store.list_donations().await? {
//!     println!("{} donated ${}", record.fields.name, record.amount_display());
//! }
//! ```

pub mod config;
pub mod store;

pub use config::AirtableConfig;
pub use store::AirtableDonationStore;
