//! Timestamp resolution for transaction records
//!
//! Source tables carry the date and the time of day in separate columns.
//! This module resolves the pair into a single absolute instant with
//! second precision and provides the whole-second arithmetic the graph
//! builder relies on.
//!
//! Dates are day-first (`14-01-2025`, `14/01/2025`); ISO dates
//! (`2025-01-14`) are accepted as well. Times are `HH:MM:SS`.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use thiserror::Error;

/// Absolute transaction instant (second precision, no time zone)
pub type Timestamp = NaiveDateTime;

/// Accepted date layouts, tried in order
const DATE_FORMATS: [&str; 3] = ["%d-%m-%Y", "%d/%m/%Y", "%Y-%m-%d"];

const TIME_FORMAT: &str = "%H:%M:%S";

/// Errors raised while resolving a timestamp
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("Unrecognized date '{0}' (expected DD-MM-YYYY, DD/MM/YYYY or YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Unrecognized time '{0}' (expected HH:MM:SS)")]
    InvalidTime(String),
}

/// Parse a day-first (or ISO) calendar date
///
/// # Example
/// ```
/// use fmea_graph_core_rs::core::time::parse_date;
///
/// let date = parse_date("14-01-2025").unwrap();
/// assert_eq!(date.to_string(), "2025-01-14");
/// ```
pub fn parse_date(raw: &str) -> Result<NaiveDate, TimeError> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| TimeError::InvalidDate(raw.to_string()))
}

/// Parse an `HH:MM:SS` time of day
pub fn parse_time(raw: &str) -> Result<NaiveTime, TimeError> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT)
        .map_err(|_| TimeError::InvalidTime(raw.to_string()))
}

/// Combine separate date and time fields into one instant
///
/// # Example
/// ```
/// use fmea_graph_core_rs::core::time::resolve_timestamp;
///
/// let ts = resolve_timestamp("14/01/2025", "08:30:15").unwrap();
/// assert_eq!(ts.to_string(), "2025-01-14 08:30:15");
/// ```
pub fn resolve_timestamp(date: &str, time: &str) -> Result<Timestamp, TimeError> {
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    Ok(date.and_time(time))
}

/// Whole seconds from `earlier` to `later`, truncated toward zero
///
/// Negative when `later` precedes `earlier`.
pub fn seconds_between(earlier: &Timestamp, later: &Timestamp) -> i64 {
    (*later - *earlier).num_seconds()
}

/// ISO-8601 rendering used by exports (`2025-01-14T08:30:15`)
pub fn to_iso(ts: &Timestamp) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}
