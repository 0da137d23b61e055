//! systemic_connectedness — rolling-window connectedness networks for
//! systemic-risk analysis, with optional Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and, behind the
//! `python-bindings` feature, as the PyO3 bridge exposing the pipeline to
//! Python through the `_systemic_connectedness` extension module.
//!
//! Key behaviors
//! -------------
//! - Re-export the core modules: OLS/HAC inference, the Granger test, VAR
//!   variance decompositions, network construction and centralities, PCA,
//!   and the rolling orchestrator.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   Python extension.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; the PyO3 layer only
//!   converts inputs, releases the GIL for long runs, and maps errors.
//!
//! Conventions
//! -----------
//! - Return matrices are `T×N` with rows = time and columns = entities.
//! - Adjacency matrices use row = source, column = target.
//! - Errors are rich enums internally and become `ValueError` in Python.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code calls [`rolling::run_connectedness`] with a
//!   [`rolling::ReturnDataset`] and [`rolling::RollingOptions`], or uses the
//!   component modules directly.
//! - The Python package imports `_systemic_connectedness` and wraps its
//!   functions in user-facing helpers.
//!
//! Testing notes
//! -------------
//! - Unit tests sit next to each module; end-to-end scenarios live in
//!   `tests/integration_connectedness_pipeline.rs`.

pub mod errors;
pub mod inference;
pub mod network;
pub mod numerical_stability;
pub mod pca;
pub mod rolling;
pub mod statistical_tests;
pub mod var;

#[cfg(feature = "python-bindings")]
pub mod utils;

pub use crate::errors::{ConnectednessError, ConnectednessResult, ErrorKind};
pub use crate::rolling::{
    AggregatedDataset, CancellationToken, ReturnDataset, RollingOptions, WindowOrchestrator, run_connectedness,
};

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    utils::{extract_f64_matrix, extract_rolling_options, matrix_to_rows, parse_centrality, parse_dates},
    var::fevd::{FevdOptions, VarianceDecomposer},
};

/// Variance decomposition of a return matrix at the final horizon step.
///
/// Parameters
/// ----------
/// - `data`: 2-D array-like, rows = time, columns = entities.
/// - `lags`, `horizon`: VAR order in `[1, 5]` and horizon in `[1, 15]`.
/// - `generalized`: generalized (order-invariant) when `True`, Cholesky
///   orthogonalized otherwise.
///
/// Returns
/// -------
/// `list[list[float]]` with row = receiving entity; every row sums to one.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (data, lags = 2, horizon = 4, generalized = true),
    text_signature = "(data, /, lags=2, horizon=4, generalized=True)"
)]
fn fevd<'py>(
    py: Python<'py>, data: &Bound<'py, PyAny>, lags: usize, horizon: usize, generalized: bool,
) -> PyResult<Vec<Vec<f64>>> {
    let matrix = extract_f64_matrix(data)?;
    let options = FevdOptions::new(lags, horizon, generalized).map_err(ConnectednessError::from)?;
    let decomposition = py
        .allow_threads(|| VarianceDecomposer::new(options).decompose(matrix.view()))
        .map_err(ConnectednessError::from)?;
    Ok(decomposition.matrix().map(matrix_to_rows).unwrap_or_default())
}

/// RollingConnectedness — Python-facing view of an [`AggregatedDataset`].
///
/// Time series are returned with one entry per observation; entries before
/// the first complete window are `None`.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "systemic_connectedness.rolling", frozen)]
pub struct RollingConnectedness {
    inner: AggregatedDataset,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl RollingConnectedness {
    #[getter]
    pub fn dates(&self) -> Vec<String> {
        self.inner.labels.clone()
    }

    #[getter]
    pub fn entity_names(&self) -> Vec<String> {
        self.inner.entity_names.clone()
    }

    #[getter]
    pub fn group_names(&self) -> Option<Vec<String>> {
        self.inner.group_names.clone()
    }

    #[getter]
    pub fn bandwidth(&self) -> usize {
        self.inner.bandwidth
    }

    #[getter]
    pub fn causality_threshold(&self) -> f64 {
        self.inner.causality_threshold
    }

    #[getter]
    pub fn window_count(&self) -> usize {
        self.inner.window_count()
    }

    #[getter]
    pub fn dci(&self) -> Vec<Option<f64>> {
        self.inner.dci().iter().map(|v| v.copied()).collect()
    }

    #[getter]
    pub fn connections_in_out(&self) -> Vec<Option<f64>> {
        self.inner.connections_in_out().iter().map(|v| v.copied()).collect()
    }

    #[getter]
    pub fn connections_in_out_other(&self) -> Option<Vec<Option<f64>>> {
        self.inner.connections_in_out_other().map(|s| s.iter().map(|v| v.copied()).collect())
    }

    #[getter]
    pub fn total_spillover(&self) -> Vec<Option<f64>> {
        self.inner.spillover.iter().map(|v| v.copied()).collect()
    }

    #[getter]
    pub fn adjacencies(&self) -> Vec<Vec<Vec<f64>>> {
        self.inner.adjacencies.iter().map(matrix_to_rows).collect()
    }

    #[getter]
    pub fn averaged_adjacency(&self) -> Vec<Vec<f64>> {
        matrix_to_rows(&self.inner.averaged_adjacency)
    }

    #[getter]
    pub fn averaged_threshold(&self) -> f64 {
        self.inner.averaged_threshold
    }

    #[getter]
    pub fn pca_explained(&self) -> Vec<f64> {
        self.inner.pca_full.explained.to_vec()
    }

    /// One centrality measure over time, e.g. `"eigenvector"` or `"katz"`.
    #[pyo3(text_signature = "(self, measure, /)")]
    pub fn centrality(&self, measure: &str) -> PyResult<Vec<Option<Vec<f64>>>> {
        let measure = parse_centrality(measure)?;
        Ok(self.inner.centrality_series(measure).iter().map(|v| v.map(|a| a.to_vec())).collect())
    }

    /// The same measure on the averaged network.
    #[pyo3(text_signature = "(self, measure, /)")]
    pub fn averaged_centrality(&self, measure: &str) -> PyResult<Vec<f64>> {
        let measure = parse_centrality(measure)?;
        Ok(measure.select(&self.inner.averaged_centralities).to_vec())
    }
}

/// Run the rolling connectedness pipeline.
///
/// The GIL is released for the duration of the run. `groups` holds the
/// 0-based start index of every group after the first and requires
/// `group_names` with one name per group.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(
    signature = (
        returns,
        dates,
        entity_names,
        bandwidth = None,
        significance = None,
        robust = None,
        k = None,
        lags = None,
        horizon = None,
        generalized = None,
        groups = None,
        group_names = None,
        threads = None,
    ),
    text_signature = "(returns, dates, entity_names, /, bandwidth=252, significance=0.05, robust=False, \
                      k=0.06, lags=2, horizon=4, generalized=True, groups=None, group_names=None, threads=None)"
)]
fn connectedness<'py>(
    py: Python<'py>, returns: &Bound<'py, PyAny>, dates: Vec<String>, entity_names: Vec<String>,
    bandwidth: Option<usize>, significance: Option<f64>, robust: Option<bool>, k: Option<f64>,
    lags: Option<usize>, horizon: Option<usize>, generalized: Option<bool>, groups: Option<Vec<usize>>,
    group_names: Option<Vec<String>>, threads: Option<usize>,
) -> PyResult<RollingConnectedness> {
    let matrix = extract_f64_matrix(returns)?;
    let dates = parse_dates(&dates)?;
    let options =
        extract_rolling_options(bandwidth, significance, robust, k, lags, horizon, generalized, threads)?;

    let mut dataset = ReturnDataset::new(dates, entity_names, matrix)?;
    match (groups, group_names) {
        (Some(boundaries), Some(names)) => dataset = dataset.with_groups(boundaries, names)?,
        (None, None) => {}
        _ => {
            return Err(pyo3::exceptions::PyValueError::new_err(
                "groups and group_names must be provided together",
            ));
        }
    }

    let token = CancellationToken::new();
    let inner = py.allow_threads(|| run_connectedness(&dataset, &options, &token, |_| {}))?;
    Ok(RollingConnectedness { inner })
}

/// Define the `_systemic_connectedness` Python module.
///
/// Key behaviors
/// -------------
/// - Create the `var` and `rolling` submodules and attach them to the parent.
/// - Register the submodules in `sys.modules` so dotted imports work.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _systemic_connectedness<'py>(py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let var_mod = PyModule::new(py, "var")?;
    var_mod.add_function(wrap_pyfunction!(fevd, &var_mod)?)?;
    m.add_submodule(&var_mod)?;

    let rolling_mod = PyModule::new(py, "rolling")?;
    rolling_mod.add_function(wrap_pyfunction!(connectedness, &rolling_mod)?)?;
    rolling_mod.add_class::<RollingConnectedness>()?;
    m.add_submodule(&rolling_mod)?;

    let modules = py.import("sys")?.getattr("modules")?;
    modules.set_item("systemic_connectedness.var", var_mod)?;
    modules.set_item("systemic_connectedness.rolling", rolling_mod)?;
    Ok(())
}
