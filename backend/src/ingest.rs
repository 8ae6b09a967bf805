//! Record Normalizer
//!
//! Projects raw CSV rows into `TransactionRecord`s:
//!
//! - Resolves the separate date and time columns into one timestamp
//! - Parses the amount and transaction type
//! - Assigns identifiers (data-row index unless an id column is configured)
//! - Drops identifying / free-text columns, keeps the rest as attributes
//!
//! Failures are per row. With `RowErrorPolicy::Skip` a bad row is recorded as
//! a `RowRejection` and the batch continues; with `RowErrorPolicy::Abort` the
//! first bad row fails the whole batch. Duplicate identifiers are not checked
//! here; the graph builder rejects them.

use crate::core::time::{resolve_timestamp, TimeError};
use crate::models::TransactionRecord;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

// ============================================================================
// Configuration
// ============================================================================

/// What to do with a row that cannot be normalized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowErrorPolicy {
    /// Record the rejection and continue
    #[default]
    Skip,
    /// Fail the batch on the first rejection
    Abort,
}

impl std::str::FromStr for RowErrorPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(RowErrorPolicy::Skip),
            "abort" => Ok(RowErrorPolicy::Abort),
            other => Err(format!("unknown row error policy '{}' (expected skip or abort)", other)),
        }
    }
}

/// Source column names for the fields the graph needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub amount: String,
    pub transaction_type: String,
    pub date: String,
    pub time: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            amount: "Transaction_Amount".to_string(),
            transaction_type: "Transaction_Type".to_string(),
            date: "Transaction_Date".to_string(),
            time: "Transaction_Time".to_string(),
        }
    }
}

fn default_dropped_columns() -> Vec<String> {
    [
        "Customer_ID",
        "Merchant_ID",
        "Transaction_ID",
        "Customer_Email",
        "Customer_Contact",
        "Transaction_Description",
        "Transaction_Currency",
        "Customer_Name",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Normalizer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Read at most this many data rows
    pub row_limit: Option<usize>,

    pub on_row_error: RowErrorPolicy,

    /// Natural-key column; `None` assigns the data-row index
    pub id_column: Option<String>,

    pub columns: ColumnMap,

    /// Columns never carried onto records
    pub dropped_columns: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            row_limit: None,
            on_row_error: RowErrorPolicy::Skip,
            id_column: None,
            columns: ColumnMap::default(),
            dropped_columns: default_dropped_columns(),
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Why a single row was rejected
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RowError {
    #[error("Missing value for column '{0}'")]
    MissingField(String),

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Invalid timestamp: {0}")]
    Timestamp(#[from] TimeError),

    #[error("Malformed CSV record: {0}")]
    Malformed(String),
}

/// A rejected row and its reason
#[derive(Debug, Clone, PartialEq)]
pub struct RowRejection {
    /// Zero-based data-row index (header excluded)
    pub row: usize,
    pub reason: RowError,
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// Batch-level ingestion failures
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Row rejected (abort policy): {0}")]
    Rejected(RowRejection),
}

// ============================================================================
// Normalizer
// ============================================================================

/// Records that survived normalization plus the rows that did not
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub records: Vec<TransactionRecord>,
    pub rejections: Vec<RowRejection>,
}

/// Resolved header positions for one input
struct Layout {
    amount: usize,
    transaction_type: usize,
    date: usize,
    time: usize,
    id: Option<usize>,
    /// (position, column name) of passthrough attributes
    kept: Vec<(usize, String)>,
}

impl Layout {
    fn resolve(headers: &csv::StringRecord, config: &IngestConfig) -> Result<Self, IngestError> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
        };

        let columns = &config.columns;
        let id = config.id_column.as_deref().map(position).transpose()?;

        let mut consumed: HashSet<&str> = config.dropped_columns.iter().map(String::as_str).collect();
        consumed.extend([
            columns.amount.as_str(),
            columns.transaction_type.as_str(),
            columns.date.as_str(),
            columns.time.as_str(),
        ]);
        if let Some(id_column) = &config.id_column {
            consumed.insert(id_column.as_str());
        }

        let kept = headers
            .iter()
            .enumerate()
            .filter(|(_, name)| !consumed.contains(name))
            .map(|(idx, name)| (idx, name.to_string()))
            .collect();

        Ok(Self {
            amount: position(&columns.amount)?,
            transaction_type: position(&columns.transaction_type)?,
            date: position(&columns.date)?,
            time: position(&columns.time)?,
            id,
            kept,
        })
    }
}

/// CSV → `TransactionRecord` projection
#[derive(Debug, Clone, Default)]
pub struct RecordNormalizer {
    config: IngestConfig,
}

impl RecordNormalizer {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    /// Normalize a CSV file
    pub fn normalize_path<P: AsRef<Path>>(&self, path: P) -> Result<NormalizedBatch, IngestError> {
        let file = std::fs::File::open(path.as_ref()).map_err(csv::Error::from)?;
        self.normalize_reader(file)
    }

    /// Normalize CSV text from any reader (header row required)
    pub fn normalize_reader<R: io::Read>(&self, reader: R) -> Result<NormalizedBatch, IngestError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let layout = Layout::resolve(&headers, &self.config)?;
        let limit = self.config.row_limit.unwrap_or(usize::MAX);

        let mut batch = NormalizedBatch::default();
        for (row, result) in csv_reader.records().enumerate().take(limit) {
            let outcome = result
                .map_err(|e| RowError::Malformed(e.to_string()))
                .and_then(|record| self.normalize_row(row, &record, &headers, &layout));

            match outcome {
                Ok(record) => batch.records.push(record),
                Err(reason) => {
                    let rejection = RowRejection { row, reason };
                    if self.config.on_row_error == RowErrorPolicy::Abort {
                        return Err(IngestError::Rejected(rejection));
                    }
                    warn!(row, reason = %rejection.reason, "Skipping transaction row");
                    batch.rejections.push(rejection);
                }
            }
        }

        info!(
            accepted = batch.records.len(),
            rejected = batch.rejections.len(),
            "Transaction rows normalized"
        );
        Ok(batch)
    }

    fn normalize_row(
        &self,
        row: usize,
        record: &csv::StringRecord,
        headers: &csv::StringRecord,
        layout: &Layout,
    ) -> Result<TransactionRecord, RowError> {
        let field = |idx: usize| required_field(record, headers, idx);

        let amount_raw = field(layout.amount)?;
        let amount: f64 = amount_raw
            .parse()
            .ok()
            .filter(|a: &f64| a.is_finite())
            .ok_or_else(|| RowError::InvalidAmount(amount_raw.to_string()))?;

        let transaction_type = field(layout.transaction_type)?.to_string();
        let timestamp = resolve_timestamp(field(layout.date)?, field(layout.time)?)?;

        let id = match layout.id {
            Some(idx) => field(idx)?.to_string(),
            None => row.to_string(),
        };

        let mut tx = TransactionRecord::new(id, amount, transaction_type, timestamp);
        for (idx, name) in &layout.kept {
            if let Some(value) = record.get(*idx) {
                tx = tx.with_attribute(name.clone(), value);
            }
        }
        Ok(tx)
    }
}

/// Non-empty value at `idx`, or `MissingField` naming the column
fn required_field<'r>(
    record: &'r csv::StringRecord,
    headers: &csv::StringRecord,
    idx: usize,
) -> Result<&'r str, RowError> {
    match record.get(idx) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(RowError::MissingField(
            headers.get(idx).unwrap_or_default().to_string(),
        )),
    }
}
