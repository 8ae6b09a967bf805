//! FMEA scoring (the map phase)
//!
//! For each transaction node:
//!
//! - Severity: 10 if amount > mean + 2σ, 7 if amount > mean + σ, else 3
//! - Occurrence: min(SIMILAR out-degree + 1, 10)
//! - Detection: 5
//! - RPN = Severity × Occurrence × Detection
//! - Failure mode: High Risk if RPN ≥ threshold
//!
//! Scoring a node depends only on its amount, its SIMILAR out-degree, the
//! global `AmountStats` and the threshold. Nodes are scored in parallel and
//! each node slot is written exactly once per run.

use crate::graph::{EdgeKind, TransactionGraph};
use crate::models::{FailureMode, RiskAssessment, Severity};
use crate::scoring::{AmountStats, ScoringError};
use rayon::prelude::*;
use tracing::{debug, info};

/// Constant detection score
pub const DETECTION: u32 = 5;

/// Upper bound on the occurrence score
pub const MAX_OCCURRENCE: u32 = 10;

/// Default RPN cutoff for High Risk
pub const DEFAULT_THRESHOLD: u32 = 30;

/// Severity tier of `amount` against the population (strict comparisons)
///
/// # Example
/// ```
/// use fmea_graph_core_rs::scoring::{fmea::severity_of, AmountStats};
/// use fmea_graph_core_rs::Severity;
///
/// let stats = AmountStats::new(50, 100.0, 10.0);
/// assert_eq!(severity_of(120.0, &stats), Severity::Elevated);
/// assert_eq!(severity_of(120.01, &stats), Severity::Extreme);
/// ```
pub fn severity_of(amount: f64, stats: &AmountStats) -> Severity {
    if amount > stats.band(2.0) {
        Severity::Extreme
    } else if amount > stats.band(1.0) {
        Severity::Elevated
    } else {
        Severity::Low
    }
}

/// Occurrence score from the SIMILAR out-degree
pub fn occurrence_of(similar_count: usize) -> u32 {
    let count = u32::try_from(similar_count).unwrap_or(u32::MAX);
    count.saturating_add(1).min(MAX_OCCURRENCE)
}

/// Pure FMEA assessment for one transaction
pub fn assess(
    amount: f64,
    similar_count: usize,
    stats: &AmountStats,
    threshold: u32,
) -> RiskAssessment {
    let severity = severity_of(amount, stats).score();
    let occurrence = occurrence_of(similar_count);
    let rpn = severity * occurrence * DETECTION;

    RiskAssessment {
        severity,
        occurrence,
        detection: DETECTION,
        rpn,
        failure_mode: FailureMode::classify(rpn, threshold),
    }
}

/// Two-phase FMEA scorer
///
/// # Example
///
/// ```
/// use fmea_graph_core_rs::core::time::resolve_timestamp;
/// use fmea_graph_core_rs::graph::build_graph;
/// use fmea_graph_core_rs::scoring::RiskScorer;
/// use fmea_graph_core_rs::TransactionRecord;
///
/// let records = (0..3)
///     .map(|i| {
///         TransactionRecord::new(
///             i.to_string(),
///             100.0,
///             "Debit".to_string(),
///             resolve_timestamp("01-01-2025", &format!("10:0{}:00", i)).unwrap(),
///         )
///     })
///     .collect();
/// let mut graph = build_graph(records).unwrap();
///
/// RiskScorer::new(30).run(&mut graph).unwrap();
///
/// // Each node has 2 SIMILAR neighbours: occurrence 3, RPN 3 * 3 * 5 = 45
/// let risk = graph.get("0").unwrap().risk().unwrap();
/// assert_eq!(risk.rpn, 45);
/// assert!(risk.failure_mode.is_high_risk());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskScorer {
    threshold: u32,
}

impl Default for RiskScorer {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl RiskScorer {
    pub fn new(threshold: u32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Reduce, then score every node; returns the global stats used
    ///
    /// # Errors
    /// `ScoringError::NoData` on an empty graph. No node is touched then.
    pub fn run(&self, graph: &mut TransactionGraph) -> Result<AmountStats, ScoringError> {
        let stats = AmountStats::from_graph(graph)?;
        info!(
            count = stats.count,
            mean = stats.mean,
            std_dev = stats.std_dev,
            "Global amount statistics"
        );

        let high_risk = self.score(graph, &stats);
        info!(
            scored = graph.node_count(),
            high_risk,
            threshold = self.threshold,
            "FMEA scoring complete"
        );
        Ok(stats)
    }

    /// Map phase: score every node against precomputed stats
    ///
    /// Overwrites any previous assessment. Returns the High Risk count.
    pub fn score(&self, graph: &mut TransactionGraph, stats: &AmountStats) -> usize {
        let similar_counts: Vec<usize> = (0..graph.node_count())
            .map(|idx| graph.out_degree_at(idx, EdgeKind::Similar))
            .collect();
        let threshold = self.threshold;

        graph
            .nodes_mut()
            .par_iter_mut()
            .zip(similar_counts.par_iter())
            .map(|(node, &similar_count)| {
                let assessment = assess(node.amount(), similar_count, stats, threshold);
                node.set_risk(assessment);
                if assessment.failure_mode.is_high_risk() {
                    debug!(
                        transaction_id = node.id(),
                        rpn = assessment.rpn,
                        "High Risk transaction"
                    );
                    1
                } else {
                    0
                }
            })
            .sum()
    }
}
