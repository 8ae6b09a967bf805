//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, PyList).

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::config::FmeaConfig;
use crate::export::NodeSnapshot;
use crate::graph::Edge;
use crate::ingest::{ColumnMap, IngestConfig, RowErrorPolicy, RowRejection};
use crate::report::SummaryReport;

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract an optional field from a Python dict.
///
/// Errors only if the value is present but has the wrong type.
fn extract_optional<T>(dict: &Bound<'_, PyDict>, key: &str) -> PyResult<Option<T>>
where
    T: for<'py> FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) if !value.is_none() => Ok(Some(value.extract()?)),
        _ => Ok(None),
    }
}

/// Extract a field, falling back to `default` when missing.
///
/// # Example
/// ```ignore
/// let threshold: u32 = extract_with_default(&py_dict, "threshold", 30)?;
/// ```
fn extract_with_default<T>(dict: &Bound<'_, PyDict>, key: &str, default: T) -> PyResult<T>
where
    T: for<'py> FromPyObject<'py>,
{
    Ok(extract_optional(dict, key)?.unwrap_or(default))
}

// ========================================================================
// Configuration Parsers
// ========================================================================

/// Convert a Python dict to `FmeaConfig`
///
/// Recognized keys (all optional): `threshold`, `row_limit`,
/// `on_row_error` ("skip" | "abort"), `id_column`, `dropped_columns`, and
/// `columns` (a dict with `amount`, `transaction_type`, `date`, `time`).
///
/// # Errors
///
/// Raises ValueError on a wrong type, an unknown row error policy, or a
/// value `FmeaConfig::validate` rejects.
pub fn parse_fmea_config(py_config: &Bound<'_, PyDict>) -> PyResult<FmeaConfig> {
    let defaults = IngestConfig::default();

    let on_row_error = match extract_optional::<String>(py_config, "on_row_error")? {
        Some(raw) => raw.parse::<RowErrorPolicy>().map_err(PyValueError::new_err)?,
        None => defaults.on_row_error,
    };

    let columns = match py_config.get_item("columns")? {
        Some(value) if !value.is_none() => parse_column_map(value.downcast::<PyDict>()?)?,
        _ => defaults.columns,
    };

    let config = FmeaConfig {
        threshold: extract_with_default(py_config, "threshold", FmeaConfig::default().threshold)?,
        ingest: IngestConfig {
            row_limit: extract_optional(py_config, "row_limit")?,
            on_row_error,
            id_column: extract_optional(py_config, "id_column")?,
            columns,
            dropped_columns: extract_with_default(py_config, "dropped_columns", defaults.dropped_columns)?,
        },
    };

    config
        .validate()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(config)
}

fn parse_column_map(py_columns: &Bound<'_, PyDict>) -> PyResult<ColumnMap> {
    let defaults = ColumnMap::default();
    Ok(ColumnMap {
        amount: extract_with_default(py_columns, "amount", defaults.amount)?,
        transaction_type: extract_with_default(py_columns, "transaction_type", defaults.transaction_type)?,
        date: extract_with_default(py_columns, "date", defaults.date)?,
        time: extract_with_default(py_columns, "time", defaults.time)?,
    })
}

// ========================================================================
// Result Converters
// ========================================================================

/// Convert SummaryReport (plus rejected row count) to a Python dict
pub fn report_to_py(
    py: Python,
    report: &SummaryReport,
    rejections: &[RowRejection],
) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("total", report.total)?;
    dict.set_item("high_risk", report.high_risk)?;
    dict.set_item("avg_rpn", report.avg_rpn)?;
    dict.set_item("min_rpn", report.min_rpn)?;
    dict.set_item("max_rpn", report.max_rpn)?;
    dict.set_item("rejected_rows", rejections.len())?;
    Ok(dict.unbind())
}

/// Convert a node snapshot to a Python dict
///
/// Risk fields are `None` for an unscored node.
pub fn node_to_py<'py>(py: Python<'py>, node: &NodeSnapshot) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("id", &node.id)?;
    dict.set_item("amount", node.amount)?;
    dict.set_item("transaction_type", &node.transaction_type)?;
    dict.set_item("timestamp", &node.timestamp)?;

    let attributes = PyDict::new(py);
    for (key, value) in &node.attributes {
        attributes.set_item(key, value)?;
    }
    dict.set_item("attributes", attributes)?;

    let risk = node.risk.as_ref();
    dict.set_item("severity", risk.map(|r| r.severity))?;
    dict.set_item("occurrence", risk.map(|r| r.occurrence))?;
    dict.set_item("detection", risk.map(|r| r.detection))?;
    dict.set_item("rpn", risk.map(|r| r.rpn))?;
    dict.set_item("failure_mode", risk.map(|r| r.failure_mode.label()))?;
    Ok(dict)
}

/// Convert an edge to a Python dict (`time_diff` is `None` for `SIMILAR`)
pub fn edge_to_py<'py>(py: Python<'py>, edge: &Edge) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new(py);
    dict.set_item("source", &edge.source)?;
    dict.set_item("target", &edge.target)?;
    dict.set_item("kind", edge.kind.label())?;
    dict.set_item("time_diff", edge.time_diff)?;
    Ok(dict)
}

/// Collect converted items into a Python list
pub fn to_py_list<'py, T>(
    py: Python<'py>,
    items: &[T],
    convert: impl Fn(Python<'py>, &T) -> PyResult<Bound<'py, PyDict>>,
) -> PyResult<Py<PyList>> {
    let list = PyList::empty(py);
    for item in items {
        list.append(convert(py, item)?)?;
    }
    Ok(list.unbind())
}
