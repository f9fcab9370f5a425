//! # Donation Configuration
//!
//! Price settings for the storefront. A `DonationConfig` is built once at
//! start-up and handed to everything that prices or bounds a donation.

use crate::error::{DonationError, DonationResult};
use crate::money::{Currency, Price};
use serde::{Deserialize, Serialize};

/// Default unit price: one coffee
pub const DEFAULT_DONATION_IN_CENTS: i64 = 500;

/// Default upper bound for a single donation
pub const DEFAULT_MAX_DONATION_IN_CENTS: i64 = 10_000;

/// Pricing for one storefront
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationConfig {
    /// Unit price per quantity step, in the smallest currency unit
    pub donation_in_cents: i64,

    /// Upper bound for a donation, in the smallest currency unit.
    /// Only used to derive the maximum quantity.
    pub max_donation_in_cents: i64,

    /// Currency for every donation
    #[serde(default)]
    pub currency: Currency,

    /// Line item name shown on the payment page
    #[serde(default = "default_product_name")]
    pub product_name: String,
}

fn default_product_name() -> String {
    "Coffee".to_string()
}

impl DonationConfig {
    pub fn new(donation_in_cents: i64, max_donation_in_cents: i64) -> Self {
        Self {
            donation_in_cents,
            max_donation_in_cents,
            currency: Currency::USD,
            product_name: default_product_name(),
        }
    }

    /// Builder: set currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Builder: set the line item name
    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }

    /// Load from a TOML string
    pub fn from_toml(toml_str: &str) -> DonationResult<Self> {
        let config: Self = toml::from_str(toml_str)
            .map_err(|e| DonationError::Configuration(format!("Invalid donation config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the price settings are usable
    pub fn validate(&self) -> DonationResult<()> {
        if self.donation_in_cents <= 0 {
            return Err(DonationError::Configuration(
                "DONATION_IN_CENTS must be positive".to_string(),
            ));
        }
        if self.max_donation_in_cents < self.donation_in_cents {
            return Err(DonationError::Configuration(
                "MAX_DONATION_IN_CENTS must be at least DONATION_IN_CENTS".to_string(),
            ));
        }
        if self.product_name.trim().is_empty() {
            return Err(DonationError::Configuration(
                "product name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Largest quantity a donor may check out
    pub fn max_quantity(&self) -> u32 {
        if self.donation_in_cents <= 0 {
            return 0;
        }
        let max = self.max_donation_in_cents / self.donation_in_cents;
        u32::try_from(max.max(0)).unwrap_or(u32::MAX)
    }

    /// Price of a single quantity step
    pub fn unit_price(&self) -> Price {
        Price::from_cents(self.donation_in_cents, self.currency)
    }

    /// Amount the donor supports with `quantity` steps, in currency units
    pub fn support_amount(&self, quantity: f64) -> f64 {
        let divisor = 10_f64.powi(i32::from(self.currency.decimal_places()));
        quantity * self.donation_in_cents as f64 / divisor
    }

    /// `support_amount` formatted for display (e.g. "$15.00")
    pub fn support_amount_display(&self, quantity: f64) -> String {
        self.currency.format_decimal(self.support_amount(quantity))
    }
}

impl Default for DonationConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DONATION_IN_CENTS, DEFAULT_MAX_DONATION_IN_CENTS)
    }
}
