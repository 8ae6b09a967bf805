//! Transaction record model
//!
//! The canonical, already-normalized shape of one input row:
//! - Identifier (unique within a batch)
//! - Amount
//! - Transaction type (categorical)
//! - Timestamp (absolute, second precision)
//! - Passthrough attributes kept from the source table
//!
//! Records are immutable once constructed; the graph builder only reads them.

use crate::core::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One normalized transaction
///
/// # Example
/// ```
/// use fmea_graph_core_rs::core::time::resolve_timestamp;
/// use fmea_graph_core_rs::TransactionRecord;
///
/// let tx = TransactionRecord::new(
///     "0".to_string(),
///     1_250.50,
///     "Transfer".to_string(),
///     resolve_timestamp("14-01-2025", "08:30:15").unwrap(),
/// )
/// .with_attribute("City", "Pune");
///
/// assert_eq!(tx.id(), "0");
/// assert_eq!(tx.attribute("City"), Some("Pune"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Unique transaction identifier
    id: String,

    /// Transaction amount
    amount: f64,

    /// Transaction type (exact-match category)
    transaction_type: String,

    /// Resolved date + time of the transaction
    timestamp: Timestamp,

    /// Columns retained from the source row, keyed by column name
    attributes: BTreeMap<String, String>,
}

impl TransactionRecord {
    /// Create a new record
    ///
    /// # Panics
    /// Panics if `id` is empty or `amount` is not finite. The record
    /// normalizer rejects such rows before constructing records.
    pub fn new(id: String, amount: f64, transaction_type: String, timestamp: Timestamp) -> Self {
        assert!(!id.is_empty(), "transaction id must not be empty");
        assert!(amount.is_finite(), "amount must be finite");

        Self {
            id,
            amount,
            transaction_type,
            timestamp,
            attributes: BTreeMap::new(),
        }
    }

    /// Attach a passthrough attribute (builder style)
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn transaction_type(&self) -> &str {
        &self.transaction_type
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// Look up a single passthrough attribute
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|v| v.as_str())
    }

    /// All passthrough attributes in column-name order
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::resolve_timestamp;

    #[test]
    #[should_panic(expected = "amount must be finite")]
    fn test_nan_amount_panics() {
        TransactionRecord::new(
            "1".to_string(),
            f64::NAN,
            "Debit".to_string(),
            resolve_timestamp("01-01-2025", "00:00:00").unwrap(),
        );
    }

    #[test]
    #[should_panic(expected = "transaction id must not be empty")]
    fn test_empty_id_panics() {
        TransactionRecord::new(
            String::new(),
            10.0,
            "Debit".to_string(),
            resolve_timestamp("01-01-2025", "00:00:00").unwrap(),
        );
    }
}
