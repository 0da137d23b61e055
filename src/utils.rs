//! utils — conversion helpers for the Python boundary.
//!
//! Accept NumPy arrays, pandas objects (through `to_numpy`) and nested
//! sequences, and turn them into the owned `ndarray` and `chrono` values the
//! core modules expect. Only compiled with the `python-bindings` feature.

use crate::rolling::{aggregate::CentralityMeasure, options::RollingOptions};
use chrono::NaiveDate;
use ndarray::Array2;
use numpy::PyReadonlyArray2;
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::PyAny,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Extract a 2-D float64 matrix (rows = time) from an array-like object.
pub fn extract_f64_matrix<'py>(raw_data: &Bound<'py, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().to_owned());
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (), None) {
        if let Ok(arr) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(arr.as_array().to_owned());
        }
    }

    let rows: Vec<Vec<f64>> = raw_data.extract().map_err(|_| {
        PyTypeError::new_err("expected a 2-D numpy.ndarray, pandas.DataFrame, or nested sequence of float64")
    })?;
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != ncols) {
        return Err(PyValueError::new_err("all rows must have the same length"));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    let nrows = if ncols == 0 { 0 } else { flat.len() / ncols };
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| PyValueError::new_err(format!("invalid matrix shape: {e}")))
}

/// Parse ISO `YYYY-MM-DD` date strings.
pub fn parse_dates(raw: &[String]) -> PyResult<Vec<NaiveDate>> {
    raw.iter()
        .enumerate()
        .map(|(i, s)| {
            NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
                .map_err(|e| PyValueError::new_err(format!("invalid date {s:?} at position {i}: {e}")))
        })
        .collect()
}

/// Build validated run options from optional keyword arguments.
pub fn extract_rolling_options(
    bandwidth: Option<usize>, significance: Option<f64>, robust: Option<bool>, k: Option<f64>,
    lags: Option<usize>, horizon: Option<usize>, generalized: Option<bool>, threads: Option<usize>,
) -> PyResult<RollingOptions> {
    let d = RollingOptions::default();
    let opts = RollingOptions::new(
        bandwidth.unwrap_or(d.bandwidth()),
        significance.unwrap_or(d.significance()),
        robust.unwrap_or(d.robust()),
        k.unwrap_or(d.causality_threshold()),
        lags.unwrap_or(d.lags()),
        horizon.unwrap_or(d.horizon()),
        generalized.unwrap_or(d.generalized()),
    )?;
    match threads {
        Some(n) => Ok(opts.with_threads(n)?),
        None => Ok(opts),
    }
}

/// Map a centrality name to its measure.
pub fn parse_centrality(name: &str) -> PyResult<CentralityMeasure> {
    let measure = match name.to_lowercase().as_str() {
        "betweenness" => CentralityMeasure::Betweenness,
        "closeness" => CentralityMeasure::Closeness,
        "degree_in" | "in_degree" => CentralityMeasure::DegreeIn,
        "degree_out" | "out_degree" => CentralityMeasure::DegreeOut,
        "degree_total" | "total_degree" => CentralityMeasure::DegreeTotal,
        "degree" => CentralityMeasure::Degree,
        "eigenvector" => CentralityMeasure::Eigenvector,
        "katz" => CentralityMeasure::Katz,
        "clustering" => CentralityMeasure::Clustering,
        other => {
            return Err(PyValueError::new_err(format!(
                "invalid centrality {other:?} (expected 'betweenness', 'closeness', 'degree_in', 'degree_out', \
                 'degree_total', 'degree', 'eigenvector', 'katz', or 'clustering')"
            )));
        }
    };
    Ok(measure)
}

/// Row-major nested vectors for returning matrices to Python.
pub fn matrix_to_rows(matrix: &Array2<f64>) -> Vec<Vec<f64>> {
    matrix.rows().into_iter().map(|r| r.to_vec()).collect()
}
