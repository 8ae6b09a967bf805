//! Pipeline - one batch from raw rows to a scored graph
//!
//! Stages, in order:
//! 1. Normalize (CSV input only)
//! 2. Build graph: nodes, `NEXT` chain, `SIMILAR` edges
//! 3. Score: global amount stats, then per-node FMEA
//! 4. Aggregate the summary report
//!
//! Each run builds a fresh graph; nothing is carried over between runs.
//!
//! # Example
//!
//! ```rust
//! use fmea_graph_core_rs::{FmeaConfig, Pipeline};
//!
//! let csv = "\
//! Transaction_Amount,Transaction_Type,Transaction_Date,Transaction_Time,City
//! 100.0,Transfer,01-03-2025,10:00:00,Pune
//! 104.0,Transfer,01-03-2025,10:20:00,Pune
//! 5000.0,Debit,01-03-2025,18:00:00,Delhi
//! ";
//!
//! let run = Pipeline::new(FmeaConfig::default())
//!     .run_reader(csv.as_bytes())
//!     .unwrap();
//!
//! assert_eq!(run.report.total, 3);
//! assert!(run.rejections.is_empty());
//! ```

use crate::config::{ConfigError, FmeaConfig};
use crate::export::{ExportError, GraphSnapshot};
use crate::graph::{build_graph, EdgeKind, GraphError, TransactionGraph};
use crate::ingest::{IngestError, NormalizedBatch, RecordNormalizer, RowRejection};
use crate::models::TransactionRecord;
use crate::report::{ReportError, SummaryReport};
use crate::scoring::{AmountStats, RiskScorer, ScoringError};
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{info, info_span};

/// Any failure that aborts a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Scoring error: {0}")]
    Scoring(#[from] ScoringError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Everything one run produced
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// Scored graph, read-only from here on
    pub graph: TransactionGraph,

    /// Baseline used for severity
    pub stats: AmountStats,

    pub report: SummaryReport,

    /// Rows skipped by the normalizer (empty for record input)
    pub rejections: Vec<RowRejection>,
}

impl PipelineRun {
    pub fn next_edge_count(&self) -> usize {
        self.graph.edge_count_of(EdgeKind::Next)
    }

    pub fn similar_edge_count(&self) -> usize {
        self.graph.edge_count_of(EdgeKind::Similar)
    }

    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::capture(&self.graph)
    }

    /// Fingerprint of the scored graph (see `GraphSnapshot::fingerprint`)
    pub fn fingerprint(&self) -> Result<String, PipelineError> {
        Ok(self.snapshot().fingerprint()?)
    }
}

/// Batch pipeline driver
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: FmeaConfig,
}

impl Pipeline {
    pub fn new(config: FmeaConfig) -> Self {
        Self { config }
    }

    /// Build from layered configuration (see `FmeaConfig::load`)
    pub fn from_config_file(path: Option<&Path>) -> Result<Self, PipelineError> {
        Ok(Self::new(FmeaConfig::load(path)?))
    }

    pub fn config(&self) -> &FmeaConfig {
        &self.config
    }

    /// Run over already-normalized records
    pub fn run_records(&self, records: Vec<TransactionRecord>) -> Result<PipelineRun, PipelineError> {
        self.finish(NormalizedBatch {
            records,
            rejections: Vec::new(),
        })
    }

    /// Normalize a CSV file, then run
    pub fn run_csv<P: AsRef<Path>>(&self, path: P) -> Result<PipelineRun, PipelineError> {
        let batch = {
            let _span = info_span!("ingest", path = %path.as_ref().display()).entered();
            RecordNormalizer::new(self.config.ingest.clone()).normalize_path(path)?
        };
        self.finish(batch)
    }

    /// Normalize CSV text from a reader, then run
    pub fn run_reader<R: io::Read>(&self, reader: R) -> Result<PipelineRun, PipelineError> {
        let batch = {
            let _span = info_span!("ingest").entered();
            RecordNormalizer::new(self.config.ingest.clone()).normalize_reader(reader)?
        };
        self.finish(batch)
    }

    fn finish(&self, batch: NormalizedBatch) -> Result<PipelineRun, PipelineError> {
        let rejected = batch.rejections.len();
        let mut graph = {
            let _span = info_span!("build_graph", records = batch.records.len()).entered();
            build_graph(batch.records)?
        };

        let stats = {
            let _span = info_span!("score", threshold = self.config.threshold).entered();
            RiskScorer::new(self.config.threshold).run(&mut graph)?
        };

        let report = SummaryReport::from_graph(&graph)?;
        info!(
            nodes = report.total,
            next_edges = graph.edge_count_of(EdgeKind::Next),
            similar_edges = graph.edge_count_of(EdgeKind::Similar),
            high_risk = report.high_risk,
            rejected_rows = rejected,
            "Pipeline run complete"
        );

        Ok(PipelineRun {
            graph,
            stats,
            report,
            rejections: batch.rejections,
        })
    }
}
