//! Tests for graph export - JSON snapshot, fingerprint and DOT rendering

use chrono::Duration;
use fmea_graph_core_rs::core::time::{resolve_timestamp, Timestamp};
use fmea_graph_core_rs::export::write_dot;
use fmea_graph_core_rs::graph::build_graph;
use fmea_graph_core_rs::{
    render_dot, EdgeKind, GraphSnapshot, RiskScorer, TransactionGraph, TransactionRecord,
};

fn base() -> Timestamp {
    resolve_timestamp("12-02-2025", "09:00:00").unwrap()
}

fn record(id: &str, amount: f64, kind: &str, offset_secs: i64) -> TransactionRecord {
    TransactionRecord::new(
        id.to_string(),
        amount,
        kind.to_string(),
        base() + Duration::seconds(offset_secs),
    )
}

fn batch() -> Vec<TransactionRecord> {
    vec![
        record("2", 100.0, "Debit", 600).with_attribute("City", "Pune"),
        record("0", 104.0, "Debit", 0).with_attribute("City", "Delhi"),
        record("1", 9_000.0, "Transfer", 300),
    ]
}

fn scored(threshold: u32) -> TransactionGraph {
    let mut graph = build_graph(batch()).unwrap();
    RiskScorer::new(threshold).run(&mut graph).unwrap();
    graph
}

// ============================================================================
// Snapshot
// ============================================================================

#[test]
fn test_snapshot_is_canonically_ordered() {
    let snapshot = GraphSnapshot::capture(&scored(30));

    let ids: Vec<&str> = snapshot.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["0", "1", "2"]);

    let edges: Vec<(EdgeKind, &str, &str)> = snapshot
        .edges
        .iter()
        .map(|e| (e.kind, e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(
        edges,
        vec![
            (EdgeKind::Next, "0", "1"),
            (EdgeKind::Next, "1", "2"),
            (EdgeKind::Similar, "0", "2"),
            (EdgeKind::Similar, "2", "0"),
        ]
    );
}

#[test]
fn test_snapshot_node_fields() {
    let snapshot = GraphSnapshot::capture(&scored(30));
    let node = &snapshot.nodes[2];

    assert_eq!(node.timestamp, "2025-02-12T09:10:00");
    assert_eq!(node.attributes.get("City").map(String::as_str), Some("Pune"));
    assert_eq!(node.risk.unwrap().occurrence, 2);
}

#[test]
fn test_unscored_snapshot_has_no_risk() {
    let snapshot = GraphSnapshot::capture(&build_graph(batch()).unwrap());
    assert!(snapshot.nodes.iter().all(|n| n.risk.is_none()));
    assert!(snapshot.high_risk_ids().is_empty());
}

#[test]
fn test_json_uses_edge_labels() {
    let json = GraphSnapshot::capture(&scored(30)).to_json().unwrap();
    assert!(json.contains("\"kind\":\"NEXT\""));
    assert!(json.contains("\"kind\":\"SIMILAR\""));
    assert!(json.contains("\"time_diff\":300"));
}

#[test]
fn test_json_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.json");
    let snapshot = GraphSnapshot::capture(&scored(30));

    snapshot.write_json(&path).unwrap();
    let restored = GraphSnapshot::read_json(&path).unwrap();

    assert_eq!(restored, snapshot);
    assert_eq!(restored.fingerprint().unwrap(), snapshot.fingerprint().unwrap());
}

// ============================================================================
// Fingerprint
// ============================================================================

#[test]
fn test_fingerprint_is_reproducible() {
    let first = GraphSnapshot::capture(&scored(30)).fingerprint().unwrap();
    let second = GraphSnapshot::capture(&scored(30)).fingerprint().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 64);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_fingerprint_ignores_input_order() {
    let mut reversed = batch();
    reversed.reverse();
    let mut graph = build_graph(reversed).unwrap();
    RiskScorer::new(30).run(&mut graph).unwrap();

    assert_eq!(
        GraphSnapshot::capture(&graph).fingerprint().unwrap(),
        GraphSnapshot::capture(&scored(30)).fingerprint().unwrap()
    );
}

#[test]
fn test_fingerprint_tracks_threshold() {
    let low = GraphSnapshot::capture(&scored(30));
    let high = GraphSnapshot::capture(&scored(1_000));

    assert!(!low.high_risk_ids().is_empty());
    assert!(high.high_risk_ids().is_empty());
    assert_ne!(low.fingerprint().unwrap(), high.fingerprint().unwrap());
}

// ============================================================================
// DOT
// ============================================================================

#[test]
fn test_dot_rendering() {
    // At 31 the two Debits (RPN 30) stay Normal, the Transfer (RPN 35) is flagged
    let graph = scored(31);
    let dot = render_dot(&graph);

    assert!(dot.starts_with("digraph transactions {"));
    assert!(dot.trim_end().ends_with('}'));
    assert!(dot.contains("\"0\" -> \"1\" [color=green, label=\"300s\"];"));
    assert!(dot.contains("\"2\" -> \"0\" [color=orange];"));
    assert!(dot.contains("Mode: High Risk\", fillcolor=red"));
    assert!(dot.contains("fillcolor=blue"));
}

#[test]
fn test_dot_unscored_nodes_are_grey() {
    let dot = render_dot(&build_graph(batch()).unwrap());
    assert!(dot.contains("\"1\" [label=\"ID: 1\", fillcolor=grey];"));
}

#[test]
fn test_dot_escapes_quotes() {
    let graph = build_graph(vec![record("say \"hi\"", 1.0, "Debit", 0)]).unwrap();
    let dot = render_dot(&graph);
    assert!(dot.contains("\"say \\\"hi\\\"\""));
}

#[test]
fn test_write_dot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("graph.dot");
    let graph = scored(30);

    write_dot(&graph, &path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), render_dot(&graph));
}
