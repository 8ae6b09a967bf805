//! FMEA Graph Core - Rust Engine
//!
//! Builds a directed graph over financial transactions and scores each one
//! with a Failure Mode and Effects Analysis (FMEA) risk priority number.
//!
//! # Architecture
//!
//! - **core**: Timestamp parsing and arithmetic
//! - **ingest**: CSV rows to `TransactionRecord`s
//! - **models**: Domain types (TransactionRecord, TransactionNode, RiskAssessment)
//! - **graph**: Graph store and edge construction (`NEXT`, `SIMILAR`)
//! - **scoring**: Global amount statistics and per-node FMEA scoring
//! - **report**: Summary aggregation and top-risk ranking
//! - **export**: JSON snapshot, fingerprint, DOT rendering
//! - **pipeline**: One batch end to end
//!
//! # Critical Invariants
//!
//! 1. `NEXT` edges form a single chain in (timestamp, id) order
//! 2. `SIMILAR` edges require the same type, |Δt| < 1h and an amount within
//!    10% of the *source* amount (asymmetric)
//! 3. Scoring uses one global baseline computed before any node is scored
//! 4. Same batch + same threshold = identical graph and scores

// Module declarations
pub mod config;
pub mod core;
pub mod export;
pub mod graph;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod scoring;

// Re-exports for convenience
pub use config::{ConfigError, FmeaConfig};
pub use crate::core::time::{TimeError, Timestamp};
pub use export::{render_dot, ExportError, GraphSnapshot, NodeSnapshot};
pub use graph::{build_graph, Edge, EdgeKind, GraphError, SimilarityIndex, TransactionGraph};
pub use ingest::{
    IngestConfig, IngestError, NormalizedBatch, RecordNormalizer, RowError, RowErrorPolicy,
    RowRejection,
};
pub use models::{FailureMode, RiskAssessment, Severity, TransactionNode, TransactionRecord};
pub use pipeline::{Pipeline, PipelineError, PipelineRun};
pub use report::{top_risks, ReportError, SummaryReport};
pub use scoring::{AmountStats, RiskScorer, ScoringError};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn fmea_graph_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::pipeline::PyFmeaPipeline>()?;
    Ok(())
}
