//! PyO3 wrapper for Pipeline
//!
//! This module provides the Python interface to the FMEA pipeline.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{edge_to_py, node_to_py, parse_fmea_config, report_to_py, to_py_list};
use crate::config::FmeaConfig;
use crate::export::GraphSnapshot;
use crate::pipeline::{Pipeline, PipelineError};

fn to_py_err(err: PipelineError) -> PyErr {
    match err {
        PipelineError::Ingest(_) | PipelineError::Config(_) => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

/// Python wrapper for the Rust pipeline
///
/// Holds the snapshot of the most recent run so `nodes()`, `edges()` and
/// `fingerprint()` can be called after `run_csv`.
///
/// # Example (from Python)
///
/// ```python
/// from fmea_graph_core_rs import FmeaPipeline
///
/// pipeline = FmeaPipeline({"threshold": 40, "row_limit": 2000})
/// summary = pipeline.run_csv("transactions.csv")
/// print(f"{summary['high_risk']} of {summary['total']} transactions are high risk")
/// risky = [n for n in pipeline.nodes() if n["failure_mode"] == "High Risk"]
/// ```
#[pyclass(name = "FmeaPipeline")]
pub struct PyFmeaPipeline {
    inner: Pipeline,
    last_run: Option<GraphSnapshot>,
}

impl PyFmeaPipeline {
    fn snapshot(&self) -> PyResult<&GraphSnapshot> {
        self.last_run
            .as_ref()
            .ok_or_else(|| PyRuntimeError::new_err("No pipeline run yet: call run_csv() first"))
    }
}

#[pymethods]
impl PyFmeaPipeline {
    /// Create a pipeline; `config` is an optional dict of overrides
    ///
    /// # Errors
    ///
    /// Raises ValueError on a malformed or invalid configuration.
    #[new]
    #[pyo3(signature = (config=None))]
    fn new(config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let config = match config {
            Some(dict) => parse_fmea_config(dict)?,
            None => FmeaConfig::default(),
        };
        Ok(PyFmeaPipeline {
            inner: Pipeline::new(config),
            last_run: None,
        })
    }

    /// Run the pipeline over a CSV file
    ///
    /// # Returns
    ///
    /// Dictionary with `total`, `high_risk`, `avg_rpn`, `min_rpn`,
    /// `max_rpn` and `rejected_rows`.
    fn run_csv(&mut self, py: Python, path: &str) -> PyResult<Py<PyDict>> {
        let run = self.inner.run_csv(path).map_err(to_py_err)?;
        let summary = report_to_py(py, &run.report, &run.rejections)?;
        self.last_run = Some(run.snapshot());
        Ok(summary)
    }

    /// Nodes of the last run, sorted by id
    fn nodes(&self, py: Python) -> PyResult<Py<PyList>> {
        to_py_list(py, &self.snapshot()?.nodes, node_to_py)
    }

    /// Edges of the last run, sorted by (kind, source, target)
    fn edges(&self, py: Python) -> PyResult<Py<PyList>> {
        to_py_list(py, &self.snapshot()?.edges, edge_to_py)
    }

    /// SHA-256 fingerprint of the last run's scored graph
    fn fingerprint(&self) -> PyResult<String> {
        self.snapshot()?
            .fingerprint()
            .map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    /// Current RPN threshold
    #[getter]
    fn threshold(&self) -> u32 {
        self.inner.config().threshold
    }
}
