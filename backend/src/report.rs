//! Summary report over a scored transaction graph
//!
//! Reduces the scored node set to totals and RPN statistics, and ranks the
//! riskiest transactions for per-transaction listings.

use crate::graph::TransactionGraph;
use crate::models::{FailureMode, TransactionNode};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors raised while aggregating a report
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("No summary data found: the transaction graph is empty")]
    NoData,

    #[error("Transaction {0} has not been scored")]
    Unscored(String),
}

/// FMEA summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryReport {
    pub total: usize,
    pub high_risk: usize,
    pub avg_rpn: f64,
    pub min_rpn: u32,
    pub max_rpn: u32,
}

impl SummaryReport {
    /// Aggregate over every node
    ///
    /// # Errors
    /// - `ReportError::NoData` on an empty graph
    /// - `ReportError::Unscored` if any node lacks a risk assessment
    pub fn from_graph(graph: &TransactionGraph) -> Result<Self, ReportError> {
        if graph.is_empty() {
            return Err(ReportError::NoData);
        }

        let mut high_risk = 0;
        let mut min_rpn = u32::MAX;
        let mut max_rpn = 0;
        let mut rpn_sum: u64 = 0;

        for node in graph.nodes() {
            let risk = node
                .risk()
                .ok_or_else(|| ReportError::Unscored(node.id().to_string()))?;
            if risk.failure_mode == FailureMode::HighRisk {
                high_risk += 1;
            }
            min_rpn = min_rpn.min(risk.rpn);
            max_rpn = max_rpn.max(risk.rpn);
            rpn_sum += u64::from(risk.rpn);
        }

        let total = graph.node_count();
        Ok(Self {
            total,
            high_risk,
            avg_rpn: rpn_sum as f64 / total as f64,
            min_rpn,
            max_rpn,
        })
    }

    /// Share of transactions flagged High Risk (0.0..=1.0)
    pub fn high_risk_ratio(&self) -> f64 {
        self.high_risk as f64 / self.total as f64
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FMEA Summary Report:")?;
        writeln!(f, "Total Transactions: {}", self.total)?;
        writeln!(f, "High Risk Transactions: {}", self.high_risk)?;
        writeln!(f, "Average RPN: {:.2}", self.avg_rpn)?;
        writeln!(f, "Minimum RPN: {:.2}", f64::from(self.min_rpn))?;
        write!(f, "Maximum RPN: {:.2}", f64::from(self.max_rpn))
    }
}

/// The `k` highest-RPN scored nodes, ties broken by transaction id
///
/// Unscored nodes are skipped.
pub fn top_risks(graph: &TransactionGraph, k: usize) -> Vec<&TransactionNode> {
    let mut scored: Vec<(&TransactionNode, u32)> = graph
        .nodes()
        .iter()
        .filter_map(|node| node.risk().map(|risk| (node, risk.rpn)))
        .collect();

    scored.sort_by(|(a, rpn_a), (b, rpn_b)| rpn_b.cmp(rpn_a).then_with(|| a.id().cmp(b.id())));
    scored.into_iter().take(k).map(|(node, _)| node).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph_is_no_data() {
        let graph = TransactionGraph::new();
        assert_eq!(SummaryReport::from_graph(&graph), Err(ReportError::NoData));
        assert!(top_risks(&graph, 5).is_empty());
    }

    #[test]
    fn test_display_matches_summary_layout() {
        let report = SummaryReport {
            total: 2000,
            high_risk: 442,
            avg_rpn: 20.5125,
            min_rpn: 15,
            max_rpn: 140,
        };
        let text = report.to_string();
        assert!(text.contains("Total Transactions: 2000"));
        assert!(text.contains("Average RPN: 20.51"));
        assert!(text.ends_with("Maximum RPN: 140.00"));
    }
}
