//! Global amount statistics (the reduce phase of scoring)

use crate::graph::TransactionGraph;
use crate::scoring::ScoringError;
use serde::{Deserialize, Serialize};

/// Population baseline for severity tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmountStats {
    /// Number of amounts reduced
    pub count: usize,

    /// Arithmetic mean
    pub mean: f64,

    /// Sample standard deviation (n - 1 denominator; 0 for a single value)
    pub std_dev: f64,
}

impl AmountStats {
    /// Build stats from known values (useful for what-if scoring and tests)
    pub fn new(count: usize, mean: f64, std_dev: f64) -> Self {
        Self {
            count,
            mean,
            std_dev,
        }
    }

    /// Reduce a sequence of amounts
    ///
    /// # Errors
    /// `ScoringError::NoData` when `amounts` is empty.
    ///
    /// # Example
    /// ```
    /// use fmea_graph_core_rs::scoring::AmountStats;
    ///
    /// let stats = AmountStats::from_amounts([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
    /// assert_eq!(stats.mean, 5.0);
    /// assert!((stats.std_dev - 2.138).abs() < 1e-3);
    /// ```
    pub fn from_amounts<I>(amounts: I) -> Result<Self, ScoringError>
    where
        I: IntoIterator<Item = f64>,
    {
        let amounts: Vec<f64> = amounts.into_iter().collect();
        let count = amounts.len();
        if count == 0 {
            return Err(ScoringError::NoData);
        }

        let mean = amounts.iter().sum::<f64>() / count as f64;
        let std_dev = if count < 2 {
            0.0
        } else {
            let sum_sq: f64 = amounts.iter().map(|a| (a - mean).powi(2)).sum();
            (sum_sq / (count - 1) as f64).sqrt()
        };

        Ok(Self {
            count,
            mean,
            std_dev,
        })
    }

    /// Reduce the amounts of every node in the graph
    pub fn from_graph(graph: &TransactionGraph) -> Result<Self, ScoringError> {
        Self::from_amounts(graph.nodes().iter().map(|node| node.amount()))
    }

    /// mean + k·σ
    pub fn band(&self, sigmas: f64) -> f64 {
        self.mean + sigmas * self.std_dev
    }
}
