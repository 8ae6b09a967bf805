//! Graph Builder
//!
//! Builds a fresh `TransactionGraph` from one batch of normalized records:
//!
//! 1. One node per record (duplicate identifiers fail the build)
//! 2. `NEXT` chain over the (timestamp, id) order: exactly n-1 edges
//! 3. `SIMILAR` edges through the bucketed time-window index
//!
//! # Critical Invariants
//!
//! - Every edge endpoint is a node of the graph
//! - No self-loops, no duplicate (source, target, kind) edges
//! - Rebuilding the same batch yields the same edge set

use crate::core::time::seconds_between;
use crate::graph::similarity::SimilarityIndex;
use crate::graph::store::{EdgeKind, GraphError, TransactionGraph};
use crate::models::TransactionRecord;
use tracing::{debug, info};

/// Build the complete transaction graph for a batch
///
/// # Example
///
/// ```
/// use fmea_graph_core_rs::core::time::resolve_timestamp;
/// use fmea_graph_core_rs::graph::{build_graph, EdgeKind};
/// use fmea_graph_core_rs::TransactionRecord;
///
/// let records: Vec<_> = [("0", 100.0, "09:00:00"), ("1", 105.0, "09:10:00"), ("2", 900.0, "17:00:00")]
///     .into_iter()
///     .map(|(id, amount, time)| {
///         TransactionRecord::new(
///             id.to_string(),
///             amount,
///             "Transfer".to_string(),
///             resolve_timestamp("05-06-2025", time).unwrap(),
///         )
///     })
///     .collect();
///
/// let graph = build_graph(records).unwrap();
/// assert_eq!(graph.edge_count_of(EdgeKind::Next), 2);
/// assert!(graph.has_edge("0", "1", EdgeKind::Similar));
/// assert!(graph.has_edge("1", "0", EdgeKind::Similar));
/// ```
pub fn build_graph(records: Vec<TransactionRecord>) -> Result<TransactionGraph, GraphError> {
    let mut graph = TransactionGraph::with_capacity(records.len());
    for record in records {
        graph.add_node(record)?;
    }

    let next = link_temporal(&mut graph);
    let similar = link_similar(&mut graph);

    info!(
        nodes = graph.node_count(),
        next_edges = next,
        similar_edges = similar,
        "Transaction graph built"
    );

    Ok(graph)
}

/// Node indices ordered by (timestamp, transaction id)
pub fn chronological_order(graph: &TransactionGraph) -> Vec<usize> {
    let nodes = graph.nodes();
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| {
        let (ra, rb) = (nodes[a].record(), nodes[b].record());
        ra.timestamp()
            .cmp(rb.timestamp())
            .then_with(|| ra.id().cmp(rb.id()))
    });
    order
}

/// Create the `NEXT` chain between chronologically adjacent transactions
///
/// Returns the number of edges added (0 when the chain already exists).
pub fn link_temporal(graph: &mut TransactionGraph) -> usize {
    let order = chronological_order(graph);

    let links: Vec<(usize, usize, i64)> = order
        .windows(2)
        .map(|pair| {
            let (earlier, later) = (pair[0], pair[1]);
            let nodes = graph.nodes();
            let diff = seconds_between(
                nodes[earlier].record().timestamp(),
                nodes[later].record().timestamp(),
            );
            (earlier, later, diff)
        })
        .collect();

    let added = links
        .into_iter()
        .filter(|&(src, dst, diff)| graph.insert_next(src, dst, diff))
        .count();

    debug!(
        added,
        total = graph.edge_count_of(EdgeKind::Next),
        "NEXT relationships created"
    );
    added
}

/// Create `SIMILAR` edges for every qualifying ordered pair
///
/// Returns the number of edges added (0 when they already exist).
pub fn link_similar(graph: &mut TransactionGraph) -> usize {
    let pairs = {
        let nodes = graph.nodes();
        let index = SimilarityIndex::build(nodes);
        debug!(buckets = index.bucket_count(), "Similarity index built");
        index.similar_pairs(nodes)
    };

    let added = pairs
        .into_iter()
        .filter(|&(src, dst)| graph.insert_similar(src, dst))
        .count();

    debug!(
        added,
        total = graph.edge_count_of(EdgeKind::Similar),
        "SIMILAR relationships created"
    );
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::resolve_timestamp;

    fn record(id: &str, time: &str) -> TransactionRecord {
        TransactionRecord::new(
            id.to_string(),
            10.0,
            "Debit".to_string(),
            resolve_timestamp("20-07-2025", time).unwrap(),
        )
    }

    #[test]
    fn test_ties_broken_by_id() {
        let graph = build_graph(vec![
            record("b", "08:00:00"),
            record("a", "08:00:00"),
            record("c", "07:00:00"),
        ])
        .unwrap();

        assert!(graph.has_edge("c", "a", EdgeKind::Next));
        assert!(graph.has_edge("a", "b", EdgeKind::Next));
        assert_eq!(graph.next_time_diff("a", "b"), Some(0));
    }

    #[test]
    fn test_relinking_adds_nothing() {
        let mut graph = build_graph(vec![
            record("a", "08:00:00"),
            record("b", "08:01:00"),
        ])
        .unwrap();
        let before = graph.clone();

        assert_eq!(link_temporal(&mut graph), 0);
        assert_eq!(link_similar(&mut graph), 0);
        assert_eq!(graph, before);
    }

    #[test]
    fn test_single_node_has_no_edges() {
        let graph = build_graph(vec![record("only", "08:00:00")]).unwrap();
        assert_eq!(graph.edge_count(), 0);
    }
}
