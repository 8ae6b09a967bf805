//! Risk Scorer
//!
//! Explicit two-phase pipeline:
//!
//! 1. **Reduce** (`stats`): mean and sample standard deviation of amounts
//! 2. **Map** (`fmea`): per-node Severity / Occurrence / Detection / RPN
//!
//! The map phase takes the reduced `AmountStats` as an argument, so it can
//! be run (and tested) in isolation.

pub mod fmea;
pub mod stats;

use thiserror::Error;

pub use fmea::{assess, RiskScorer, DEFAULT_THRESHOLD, DETECTION};
pub use stats::AmountStats;

/// Errors raised by the scorer
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoringError {
    #[error("No data: cannot compute amount statistics over an empty transaction set")]
    NoData,
}
