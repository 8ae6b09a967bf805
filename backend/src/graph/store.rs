//! In-memory transaction graph
//!
//! Replaces a general graph database with the two access patterns the
//! pipeline needs: "all nodes" and "out-edges of kind X from node N".
//!
//! Key features:
//! - Node table keyed by transaction ID (BTreeMap for sorted lookup)
//! - Stable node indices in insertion order
//! - Out-edges partitioned by edge kind, one slot per node
//! - At most one edge per (source, target, kind); re-insertion is a no-op

use crate::models::{TransactionNode, TransactionRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use thiserror::Error;

// ============================================================================
// Edges
// ============================================================================

/// Relationship type between two transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    /// Chronological successor
    #[serde(rename = "NEXT")]
    Next,

    /// Behaviorally similar transaction
    #[serde(rename = "SIMILAR")]
    Similar,
}

impl EdgeKind {
    pub fn label(self) -> &'static str {
        match self {
            EdgeKind::Next => "NEXT",
            EdgeKind::Similar => "SIMILAR",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Owned view of one directed edge
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,

    /// Seconds between source and target (`NEXT` only)
    pub time_diff: Option<i64>,
}

/// Errors raised while mutating the graph
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate transaction id: {0}")]
    DuplicateTransaction(String),

    #[error("Transaction not found: {0}")]
    UnknownTransaction(String),

    #[error("Self-loop rejected on transaction {0}")]
    SelfLoop(String),

    #[error("NEXT edge {from} -> {to} has negative time_diff {time_diff}")]
    NegativeTimeDiff {
        from: String,
        to: String,
        time_diff: i64,
    },
}

/// Out-edges of a single node, partitioned by kind
#[derive(Debug, Clone, Default, PartialEq)]
struct OutEdges {
    /// target index → time_diff
    next: BTreeMap<usize, i64>,

    /// target indices
    similar: BTreeSet<usize>,
}

// ============================================================================
// TransactionGraph
// ============================================================================

/// Transaction graph: one node per transaction plus typed directed edges
///
/// # Determinism
///
/// - Node indices follow insertion order
/// - Edge iteration is sorted by (source index, target index)
/// - All maps are BTree-based
///
/// # Example
///
/// ```
/// use fmea_graph_core_rs::core::time::resolve_timestamp;
/// use fmea_graph_core_rs::graph::{EdgeKind, TransactionGraph};
/// use fmea_graph_core_rs::TransactionRecord;
///
/// let mut graph = TransactionGraph::new();
/// for (id, time) in [("a", "10:00:00"), ("b", "10:05:00")] {
///     let ts = resolve_timestamp("01-02-2025", time).unwrap();
///     graph
///         .add_node(TransactionRecord::new(id.to_string(), 100.0, "Debit".to_string(), ts))
///         .unwrap();
/// }
///
/// assert!(graph.add_next_edge("a", "b", 300).unwrap());
/// assert!(!graph.add_next_edge("a", "b", 300).unwrap(), "duplicate is a no-op");
/// assert_eq!(graph.edge_count_of(EdgeKind::Next), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionGraph {
    /// Transaction ID → node index
    id_to_index: BTreeMap<String, usize>,

    /// Nodes in insertion order
    nodes: Vec<TransactionNode>,

    /// Out-edges, parallel to `nodes`
    out: Vec<OutEdges>,
}

impl TransactionGraph {
    /// Create empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create empty graph sized for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            id_to_index: BTreeMap::new(),
            nodes: Vec::with_capacity(capacity),
            out: Vec::with_capacity(capacity),
        }
    }

    /// Insert a node for `record`
    ///
    /// Duplicate identifiers are rejected; the existing node is left untouched.
    pub fn add_node(&mut self, record: TransactionRecord) -> Result<usize, GraphError> {
        if self.id_to_index.contains_key(record.id()) {
            return Err(GraphError::DuplicateTransaction(record.id().to_string()));
        }

        let idx = self.nodes.len();
        self.id_to_index.insert(record.id().to_string(), idx);
        self.nodes.push(TransactionNode::new(record));
        self.out.push(OutEdges::default());
        Ok(idx)
    }

    /// Number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges of every kind
    pub fn edge_count(&self) -> usize {
        self.edge_count_of(EdgeKind::Next) + self.edge_count_of(EdgeKind::Similar)
    }

    /// Number of edges of one kind
    pub fn edge_count_of(&self, kind: EdgeKind) -> usize {
        self.out
            .iter()
            .map(|edges| match kind {
                EdgeKind::Next => edges.next.len(),
                EdgeKind::Similar => edges.similar.len(),
            })
            .sum()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.id_to_index.contains_key(id)
    }

    /// Get node by transaction ID
    pub fn get(&self, id: &str) -> Option<&TransactionNode> {
        self.id_to_index.get(id).map(|&idx| &self.nodes[idx])
    }

    /// Get node index (stable)
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }

    /// Get node by index
    pub fn node_at(&self, idx: usize) -> Option<&TransactionNode> {
        self.nodes.get(idx)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[TransactionNode] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [TransactionNode] {
        &mut self.nodes
    }

    /// Add a `NEXT` edge between two existing transactions
    ///
    /// Returns `Ok(false)` if the edge was already present.
    pub fn add_next_edge(
        &mut self,
        source: &str,
        target: &str,
        time_diff: i64,
    ) -> Result<bool, GraphError> {
        let (src, dst) = self.resolve_endpoints(source, target)?;
        if time_diff < 0 {
            return Err(GraphError::NegativeTimeDiff {
                from: source.to_string(),
                to: target.to_string(),
                time_diff,
            });
        }
        Ok(self.insert_next(src, dst, time_diff))
    }

    /// Add a `SIMILAR` edge between two existing transactions
    ///
    /// Returns `Ok(false)` if the edge was already present.
    pub fn add_similar_edge(&mut self, source: &str, target: &str) -> Result<bool, GraphError> {
        let (src, dst) = self.resolve_endpoints(source, target)?;
        Ok(self.insert_similar(src, dst))
    }

    fn resolve_endpoints(&self, source: &str, target: &str) -> Result<(usize, usize), GraphError> {
        let src = self
            .index_of(source)
            .ok_or_else(|| GraphError::UnknownTransaction(source.to_string()))?;
        let dst = self
            .index_of(target)
            .ok_or_else(|| GraphError::UnknownTransaction(target.to_string()))?;
        if src == dst {
            return Err(GraphError::SelfLoop(source.to_string()));
        }
        Ok((src, dst))
    }

    /// Index-level insert; callers guarantee `src != dst` and valid indices
    pub(crate) fn insert_next(&mut self, src: usize, dst: usize, time_diff: i64) -> bool {
        debug_assert!(src != dst);
        let next = &mut self.out[src].next;
        if next.contains_key(&dst) {
            return false;
        }
        next.insert(dst, time_diff);
        true
    }

    /// Index-level insert; callers guarantee `src != dst` and valid indices
    pub(crate) fn insert_similar(&mut self, src: usize, dst: usize) -> bool {
        debug_assert!(src != dst);
        self.out[src].similar.insert(dst)
    }

    /// Check if edge exists
    pub fn has_edge(&self, source: &str, target: &str, kind: EdgeKind) -> bool {
        match (self.index_of(source), self.index_of(target)) {
            (Some(src), Some(dst)) => match kind {
                EdgeKind::Next => self.out[src].next.contains_key(&dst),
                EdgeKind::Similar => self.out[src].similar.contains(&dst),
            },
            _ => false,
        }
    }

    /// `time_diff` of the `NEXT` edge source → target, if present
    pub fn next_time_diff(&self, source: &str, target: &str) -> Option<i64> {
        let src = self.index_of(source)?;
        let dst = self.index_of(target)?;
        self.out[src].next.get(&dst).copied()
    }

    /// Out-degree of a node restricted to one edge kind
    pub fn out_degree(&self, id: &str, kind: EdgeKind) -> Option<usize> {
        self.index_of(id).map(|idx| self.out_degree_at(idx, kind))
    }

    pub(crate) fn out_degree_at(&self, idx: usize, kind: EdgeKind) -> usize {
        match kind {
            EdgeKind::Next => self.out[idx].next.len(),
            EdgeKind::Similar => self.out[idx].similar.len(),
        }
    }

    /// Out-edges of one kind from a node (sorted by target index)
    pub fn out_edges(&self, id: &str, kind: EdgeKind) -> Vec<Edge> {
        self.index_of(id)
            .map(|idx| self.out_edges_at(idx, kind))
            .unwrap_or_default()
    }

    fn out_edges_at(&self, idx: usize, kind: EdgeKind) -> Vec<Edge> {
        let source = self.nodes[idx].id();
        match kind {
            EdgeKind::Next => self.out[idx]
                .next
                .iter()
                .map(|(&dst, &diff)| Edge {
                    source: source.to_string(),
                    target: self.nodes[dst].id().to_string(),
                    kind,
                    time_diff: Some(diff),
                })
                .collect(),
            EdgeKind::Similar => self.out[idx]
                .similar
                .iter()
                .map(|&dst| Edge {
                    source: source.to_string(),
                    target: self.nodes[dst].id().to_string(),
                    kind,
                    time_diff: None,
                })
                .collect(),
        }
    }

    /// All edges of every kind, grouped by source node then kind
    pub fn edges(&self) -> Vec<Edge> {
        (0..self.nodes.len())
            .flat_map(|idx| {
                let mut edges = self.out_edges_at(idx, EdgeKind::Next);
                edges.extend(self.out_edges_at(idx, EdgeKind::Similar));
                edges
            })
            .collect()
    }

    /// All edges of one kind
    pub fn edges_of(&self, kind: EdgeKind) -> Vec<Edge> {
        (0..self.nodes.len())
            .flat_map(|idx| self.out_edges_at(idx, kind))
            .collect()
    }
}

// ============================================================================
// Tests (module-level)
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::resolve_timestamp;

    fn record(id: &str) -> TransactionRecord {
        TransactionRecord::new(
            id.to_string(),
            50.0,
            "Debit".to_string(),
            resolve_timestamp("01-01-2025", "09:00:00").unwrap(),
        )
    }

    #[test]
    fn test_graph_empty() {
        let graph = TransactionGraph::new();
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.edges().is_empty());
    }

    #[test]
    fn test_duplicate_node_rejected_and_original_kept() {
        let mut graph = TransactionGraph::new();
        graph.add_node(record("7")).unwrap();

        let err = graph.add_node(record("7")).unwrap_err();
        assert_eq!(err, GraphError::DuplicateTransaction("7".to_string()));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut graph = TransactionGraph::new();
        graph.add_node(record("a")).unwrap();

        assert_eq!(
            graph.add_similar_edge("a", "a"),
            Err(GraphError::SelfLoop("a".to_string()))
        );
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let mut graph = TransactionGraph::new();
        graph.add_node(record("a")).unwrap();

        assert_eq!(
            graph.add_similar_edge("a", "zz"),
            Err(GraphError::UnknownTransaction("zz".to_string()))
        );
    }

    #[test]
    fn test_negative_time_diff_rejected() {
        let mut graph = TransactionGraph::new();
        graph.add_node(record("a")).unwrap();
        graph.add_node(record("b")).unwrap();

        assert!(matches!(
            graph.add_next_edge("a", "b", -1),
            Err(GraphError::NegativeTimeDiff { .. })
        ));
    }

    #[test]
    fn test_edge_kinds_are_independent() {
        let mut graph = TransactionGraph::new();
        graph.add_node(record("a")).unwrap();
        graph.add_node(record("b")).unwrap();

        assert!(graph.add_next_edge("a", "b", 0).unwrap());
        assert!(graph.add_similar_edge("a", "b").unwrap());
        assert!(!graph.add_similar_edge("a", "b").unwrap());

        assert_eq!(graph.edge_count(), 2);
        assert_eq!(graph.out_degree("a", EdgeKind::Similar), Some(1));
        assert_eq!(graph.out_degree("b", EdgeKind::Similar), Some(0));
        assert!(!graph.has_edge("b", "a", EdgeKind::Similar));
    }
}
