//! Bucketed Time-Window Index for SIMILAR Edges
//!
//! A naive SIMILAR pass compares every ordered pair of transactions, which
//! is quadratic in the batch size. This index restricts the comparison to
//! candidates that can possibly match:
//!
//! 1. Bucket by transaction type (exact match is required anyway)
//! 2. Sort each bucket by timestamp
//! 3. For a source node, binary-search the window of bucket members whose
//!    timestamps lie strictly within one hour of the source
//! 4. Apply the amount tolerance to each candidate in the window
//!
//! The index emits exactly the edge set of the pairwise definition, including
//! the asymmetric amount tolerance (measured against the source amount).
//!
//! # Determinism
//!
//! - Buckets keyed by type in a BTreeMap
//! - Bucket members ordered by (timestamp, node index)
//! - Targets per source returned in ascending node index order

use crate::core::time::Timestamp;
use crate::models::{TransactionNode, TransactionRecord};
use chrono::Duration;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Relative amount tolerance, measured against the source amount
pub const AMOUNT_TOLERANCE: f64 = 0.1;

/// Two transactions must be strictly closer than this many seconds
pub const SIMILARITY_WINDOW_SECS: i64 = 3600;

fn window() -> Duration {
    Duration::seconds(SIMILARITY_WINDOW_SECS)
}

/// Amount part of the predicate: `|source - target| < 0.1 × source`
///
/// Asymmetric: a zero or negative source amount admits no target.
pub fn within_amount_tolerance(source_amount: f64, target_amount: f64) -> bool {
    (source_amount - target_amount).abs() < AMOUNT_TOLERANCE * source_amount
}

/// Time part of the predicate: `|t_a - t_b| < 3600s`
pub fn within_time_window(a: &Timestamp, b: &Timestamp) -> bool {
    (*a - *b).num_seconds().abs() < SIMILARITY_WINDOW_SECS
}

/// Full pairwise predicate for a directed SIMILAR edge `source → target`
///
/// # Example
/// ```
/// use fmea_graph_core_rs::core::time::resolve_timestamp;
/// use fmea_graph_core_rs::graph::similarity::is_similar;
/// use fmea_graph_core_rs::TransactionRecord;
///
/// let at = |id: &str, amount: f64, time: &str| {
///     TransactionRecord::new(
///         id.to_string(),
///         amount,
///         "Transfer".to_string(),
///         resolve_timestamp("02-03-2025", time).unwrap(),
///     )
/// };
///
/// let a = at("a", 100.0, "12:00:00");
/// let b = at("b", 111.0, "12:10:00");
///
/// assert!(!is_similar(&a, &b), "11 is not below 10% of 100");
/// assert!(is_similar(&b, &a), "11 is below 10% of 111");
/// ```
pub fn is_similar(source: &TransactionRecord, target: &TransactionRecord) -> bool {
    source.id() != target.id()
        && source.transaction_type() == target.transaction_type()
        && within_amount_tolerance(source.amount(), target.amount())
        && within_time_window(source.timestamp(), target.timestamp())
}

// ============================================================================
// SimilarityIndex
// ============================================================================

/// Type-bucketed, time-sorted index over a node slice
///
/// Holds node indices only; the node slice it was built from must be passed
/// back in when querying.
#[derive(Debug)]
pub struct SimilarityIndex {
    /// Transaction type → node indices sorted by (timestamp, index)
    buckets: BTreeMap<String, Vec<usize>>,
}

impl SimilarityIndex {
    /// Build index over `nodes` (linear bucketing plus a sort per bucket)
    pub fn build(nodes: &[TransactionNode]) -> Self {
        let mut buckets: BTreeMap<String, Vec<usize>> = BTreeMap::new();

        for (idx, node) in nodes.iter().enumerate() {
            buckets
                .entry(node.record().transaction_type().to_string())
                .or_default()
                .push(idx);
        }

        for members in buckets.values_mut() {
            members.sort_by(|&a, &b| {
                nodes[a]
                    .record()
                    .timestamp()
                    .cmp(nodes[b].record().timestamp())
                    .then(a.cmp(&b))
            });
        }

        Self { buckets }
    }

    /// Number of distinct transaction types
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket members whose timestamps lie strictly within the window of
    /// `source` (the source itself included)
    pub fn window_candidates<'a>(
        &'a self,
        nodes: &[TransactionNode],
        source: usize,
    ) -> &'a [usize] {
        let record = nodes[source].record();
        let Some(members) = self.buckets.get(record.transaction_type()) else {
            return &[];
        };
        let ts = *record.timestamp();
        let span = window();

        // First member with t > ts - window (or the bucket start on underflow)
        let lo = match ts.checked_sub_signed(span) {
            Some(floor) => members.partition_point(|&j| *nodes[j].record().timestamp() <= floor),
            None => 0,
        };
        // First member with t >= ts + window (or the bucket end on overflow)
        let hi = match ts.checked_add_signed(span) {
            Some(ceiling) => members.partition_point(|&j| *nodes[j].record().timestamp() < ceiling),
            None => members.len(),
        };

        if lo >= hi {
            return &[];
        }
        &members[lo..hi]
    }

    /// SIMILAR targets of `source`, ascending by node index
    pub fn targets_of(&self, nodes: &[TransactionNode], source: usize) -> Vec<usize> {
        let source_amount = nodes[source].amount();
        let mut targets: Vec<usize> = self
            .window_candidates(nodes, source)
            .iter()
            .copied()
            .filter(|&j| j != source && within_amount_tolerance(source_amount, nodes[j].amount()))
            .collect();
        targets.sort_unstable();
        targets
    }

    /// Every directed SIMILAR pair `(source, target)`, sorted
    ///
    /// Sources are evaluated in parallel; the result order does not depend on
    /// thread scheduling.
    pub fn similar_pairs(&self, nodes: &[TransactionNode]) -> Vec<(usize, usize)> {
        let per_source: Vec<Vec<usize>> = (0..nodes.len())
            .into_par_iter()
            .map(|source| self.targets_of(nodes, source))
            .collect();

        per_source
            .into_iter()
            .enumerate()
            .flat_map(|(source, targets)| targets.into_iter().map(move |target| (source, target)))
            .collect()
    }
}
