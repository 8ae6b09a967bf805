//! Tests for the summary report and top-risk ranking

use chrono::Duration;
use fmea_graph_core_rs::core::time::{resolve_timestamp, Timestamp};
use fmea_graph_core_rs::graph::build_graph;
use fmea_graph_core_rs::{
    top_risks, FailureMode, ReportError, RiskScorer, SummaryReport, TransactionGraph,
    TransactionRecord,
};
use proptest::prelude::*;

fn base() -> Timestamp {
    resolve_timestamp("05-09-2025", "06:00:00").unwrap()
}

fn record(id: &str, amount: f64, kind: &str, offset_secs: i64) -> TransactionRecord {
    TransactionRecord::new(
        id.to_string(),
        amount,
        kind.to_string(),
        base() + Duration::seconds(offset_secs),
    )
}

/// Three clustered Debits, one lone Credit, one large isolated Transfer
fn scored_fixture(threshold: u32) -> TransactionGraph {
    let mut graph = build_graph(vec![
        record("a", 100.0, "Debit", 0),
        record("b", 102.0, "Debit", 120),
        record("c", 98.0, "Debit", 240),
        record("d", 100.0, "Credit", 300),
        record("e", 5_000.0, "Transfer", 20_000),
    ])
    .unwrap();
    RiskScorer::new(threshold).run(&mut graph).unwrap();
    graph
}

#[test]
fn test_report_over_fixture() {
    let graph = scored_fixture(30);
    let report = SummaryReport::from_graph(&graph).unwrap();

    // a, b, c: severity 3, occurrence 3 → 45
    // d: severity 3, occurrence 1 → 15
    // e: amount far above the rest, but one outlier in five only reaches mean + σ → 7 × 1 × 5 = 35
    assert_eq!(report.total, 5);
    assert_eq!(report.min_rpn, 15);
    assert_eq!(report.max_rpn, 45);
    assert_eq!(report.high_risk, 4);
    assert!((report.avg_rpn - (45.0 * 3.0 + 15.0 + 35.0) / 5.0).abs() < 1e-9);
    assert!((report.high_risk_ratio() - 0.8).abs() < 1e-12);
}

#[test]
fn test_report_requires_scored_nodes() {
    let graph = build_graph(vec![record("x", 10.0, "Debit", 0)]).unwrap();
    assert_eq!(
        SummaryReport::from_graph(&graph),
        Err(ReportError::Unscored("x".to_string()))
    );
}

#[test]
fn test_report_on_empty_graph() {
    assert_eq!(
        SummaryReport::from_graph(&TransactionGraph::new()),
        Err(ReportError::NoData)
    );
}

#[test]
fn test_display_layout() {
    let report = SummaryReport::from_graph(&scored_fixture(30)).unwrap();
    let lines: Vec<String> = report.to_string().lines().map(String::from).collect();

    assert_eq!(
        lines,
        vec![
            "FMEA Summary Report:",
            "Total Transactions: 5",
            "High Risk Transactions: 4",
            "Average RPN: 37.00",
            "Minimum RPN: 15.00",
            "Maximum RPN: 45.00",
        ]
    );
}

#[test]
fn test_top_risks_ranked_by_rpn_then_id() {
    let graph = scored_fixture(30);
    let ids: Vec<&str> = top_risks(&graph, 4).iter().map(|n| n.id()).collect();

    assert_eq!(ids, vec!["a", "b", "c", "e"]);
    assert_eq!(top_risks(&graph, 100).len(), 5);
    assert!(top_risks(&graph, 0).is_empty());
}

proptest! {
    #[test]
    fn prop_aggregates_are_consistent(
        rows in prop::collection::vec((1.0f64..2_000.0, 0usize..3, 0i64..20_000), 1..60),
        threshold in 0u32..200
    ) {
        let kinds = ["Debit", "Credit", "Transfer"];
        let records: Vec<TransactionRecord> = rows
            .iter()
            .enumerate()
            .map(|(i, &(amount, kind, offset))| record(&i.to_string(), amount, kinds[kind], offset))
            .collect();
        let mut graph = build_graph(records).unwrap();
        RiskScorer::new(threshold).run(&mut graph).unwrap();

        let report = SummaryReport::from_graph(&graph).unwrap();
        let flagged = graph
            .nodes()
            .iter()
            .filter(|n| n.risk().unwrap().failure_mode == FailureMode::HighRisk)
            .count();

        prop_assert_eq!(report.total, graph.node_count());
        prop_assert_eq!(report.high_risk, flagged);
        prop_assert!(f64::from(report.min_rpn) <= report.avg_rpn + 1e-9);
        prop_assert!(report.avg_rpn <= f64::from(report.max_rpn) + 1e-9);
    }
}
