//! Graph Export - Snapshot, Fingerprint and DOT Rendering
//!
//! Hands the scored graph to external consumers (graph stores, dashboards,
//! plotting tools) without exposing the in-memory structure.
//!
//! # Critical Invariants
//!
//! - **Canonical order**: nodes sorted by id, edges by (kind, source, target)
//! - **Reproducibility**: the same batch and threshold produce the same
//!   fingerprint, run after run
//! - **Read-only**: exporting never mutates the graph

use crate::core::time::to_iso;
use crate::graph::{Edge, EdgeKind, TransactionGraph};
use crate::models::{FailureMode, RiskAssessment, TransactionNode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors raised while exporting
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Node view for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub amount: f64,
    pub transaction_type: String,
    /// ISO-8601, second precision
    pub timestamp: String,
    pub attributes: BTreeMap<String, String>,
    /// Absent until scored
    pub risk: Option<RiskAssessment>,
}

impl From<&TransactionNode> for NodeSnapshot {
    fn from(node: &TransactionNode) -> Self {
        let record = node.record();
        NodeSnapshot {
            id: record.id().to_string(),
            amount: record.amount(),
            transaction_type: record.transaction_type().to_string(),
            timestamp: to_iso(record.timestamp()),
            attributes: record.attributes().clone(),
            risk: node.risk().copied(),
        }
    }
}

/// Complete, canonically ordered view of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<Edge>,
}

impl GraphSnapshot {
    /// Capture the current state of `graph`
    pub fn capture(graph: &TransactionGraph) -> Self {
        let mut nodes: Vec<NodeSnapshot> = graph.nodes().iter().map(NodeSnapshot::from).collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let mut edges = graph.edges();
        edges.sort_by(|a, b| {
            a.kind
                .cmp(&b.kind)
                .then_with(|| a.source.cmp(&b.source))
                .then_with(|| a.target.cmp(&b.target))
        });

        Self { nodes, edges }
    }

    /// Canonical JSON rendering
    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string(self)?)
    }

    /// SHA-256 of the canonical JSON, lowercase hex
    pub fn fingerprint(&self) -> Result<String, ExportError> {
        let json = self.to_json()?;
        let mut hasher = Sha256::new();
        hasher.update(json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Write pretty-printed JSON to `path`
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Read a snapshot previously written with `write_json`
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    pub fn high_risk_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| matches!(n.risk, Some(r) if r.failure_mode == FailureMode::HighRisk))
            .map(|n| n.id.as_str())
            .collect()
    }
}

// ============================================================================
// DOT Rendering
// ============================================================================

fn node_color(node: &TransactionNode) -> &'static str {
    match node.risk().map(|r| r.failure_mode) {
        Some(FailureMode::HighRisk) => "red",
        Some(FailureMode::Normal) => "blue",
        None => "grey",
    }
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render the graph as a Graphviz digraph
///
/// Nodes: red for High Risk, blue for Normal, grey if unscored.
/// Edges: `NEXT` green (labeled with `time_diff`), `SIMILAR` orange.
pub fn render_dot(graph: &TransactionGraph) -> String {
    let mut dot = String::from("digraph transactions {\n    node [shape=circle, style=filled, fontcolor=white];\n");

    for node in graph.nodes() {
        let id = escape(node.id());
        let label = match node.risk() {
            Some(risk) => format!("ID: {}\\nRPN: {}\\nMode: {}", id, risk.rpn, risk.failure_mode),
            None => format!("ID: {}", id),
        };
        let _ = writeln!(
            dot,
            "    \"{}\" [label=\"{}\", fillcolor={}];",
            id,
            label,
            node_color(node)
        );
    }

    for edge in graph.edges() {
        match edge.kind {
            EdgeKind::Next => {
                let _ = writeln!(
                    dot,
                    "    \"{}\" -> \"{}\" [color=green, label=\"{}s\"];",
                    escape(&edge.source),
                    escape(&edge.target),
                    edge.time_diff.unwrap_or_default()
                );
            }
            EdgeKind::Similar => {
                let _ = writeln!(
                    dot,
                    "    \"{}\" -> \"{}\" [color=orange];",
                    escape(&edge.source),
                    escape(&edge.target)
                );
            }
        }
    }

    dot.push_str("}\n");
    dot
}

/// Write the DOT rendering to `path`
pub fn write_dot<P: AsRef<Path>>(graph: &TransactionGraph, path: P) -> Result<(), ExportError> {
    fs::write(path, render_dot(graph))?;
    Ok(())
}
