//! # Donation Records
//!
//! Past donations as kept by the external records store.

use serde::{Deserialize, Serialize};

/// A stored donation: `{id, fields: {name, amount, message}}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationRecord {
    pub id: String,
    pub fields: DonationFields,
}

/// Record payload. `amount` is in whole currency units, as the records
/// store keeps it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonationFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub message: String,
}

impl DonationFields {
    pub fn new(name: impl Into<String>, amount: f64, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount,
            message: message.into(),
        }
    }
}

impl DonationRecord {
    pub fn new(id: impl Into<String>, fields: DonationFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Amount as listed on the page: `5`, `12.5`
    pub fn amount_display(&self) -> String {
        self.fields.amount.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_wire_format() {
        let json = r#"[{"id":"1","fields":{"name":"Ana","amount":5,"message":"nice"}}]"#;
        let records: Vec<DonationRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[0].fields.name, "Ana");
        assert_eq!(records[0].fields.amount, 5.0);
        assert_eq!(records[0].amount_display(), "5");
    }

    #[test]
    fn test_missing_fields_default() {
        // the records store omits empty cells
        let record: DonationRecord =
            serde_json::from_str(r#"{"id":"rec1","fields":{"amount":2.5}}"#).unwrap();
        assert_eq!(record.fields.name, "");
        assert_eq!(record.amount_display(), "2.5");
    }
}
