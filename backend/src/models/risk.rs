//! FMEA risk fields attached to each transaction node
//!
//! These are plain value types. The arithmetic that produces them lives in
//! `scoring::fmea`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity tier derived from how far an amount sits above the mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// At or below mean + 1σ
    Low,
    /// Above mean + 1σ, at or below mean + 2σ
    Elevated,
    /// Above mean + 2σ
    Extreme,
}

impl Severity {
    /// FMEA severity score (3, 7 or 10)
    pub fn score(self) -> u32 {
        match self {
            Severity::Low => 3,
            Severity::Elevated => 7,
            Severity::Extreme => 10,
        }
    }
}

/// Binary classification of a scored transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureMode {
    HighRisk,
    Normal,
}

impl FailureMode {
    /// `HighRisk` when `rpn >= threshold` (boundary inclusive)
    ///
    /// # Example
    /// ```
    /// use fmea_graph_core_rs::FailureMode;
    ///
    /// assert_eq!(FailureMode::classify(30, 30), FailureMode::HighRisk);
    /// assert_eq!(FailureMode::classify(29, 30), FailureMode::Normal);
    /// ```
    pub fn classify(rpn: u32, threshold: u32) -> Self {
        if rpn >= threshold {
            FailureMode::HighRisk
        } else {
            FailureMode::Normal
        }
    }

    pub fn is_high_risk(self) -> bool {
        self == FailureMode::HighRisk
    }

    /// Human-readable label ("High Risk" / "Normal")
    pub fn label(self) -> &'static str {
        match self {
            FailureMode::HighRisk => "High Risk",
            FailureMode::Normal => "Normal",
        }
    }
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Complete FMEA result for one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Severity score: 3, 7 or 10
    pub severity: u32,

    /// Occurrence score: 1..=10
    pub occurrence: u32,

    /// Detection score (constant)
    pub detection: u32,

    /// Risk Priority Number = severity × occurrence × detection
    pub rpn: u32,

    pub failure_mode: FailureMode,
}
