//! errors — crate-level error type for the rolling connectedness pipeline.
//!
//! Purpose
//! -------
//! Give callers of the end-to-end API a single error type that classifies
//! every failure into one of a few kinds: bad configuration, a model that
//! could not be fitted, a numerical breakdown, a user cancellation, or a
//! worker-pool problem.
//!
//! Key behaviors
//! -------------
//! - Configuration variants are produced by `RollingOptions` and
//!   `ReturnDataset` validation before any computation starts.
//! - Subtree errors ([`VarError`], [`GrangerError`], [`NetworkError`],
//!   [`PcaError`]) are wrapped via `From`, so `?` composes across layers.
//! - [`ConnectednessError::kind`] maps every variant onto [`ErrorKind`].
//!
//! Conventions
//! -----------
//! - Window-level failures carry the 0-based window index so that a failed
//!   run can be traced back to the offending slice.
//! - At the Python boundary every variant becomes a `ValueError` carrying
//!   the `Display` text.

use crate::{
    network::errors::NetworkError, pca::PcaError, statistical_tests::errors::GrangerError, var::errors::VarError,
};

pub type ConnectednessResult<T> = Result<T, ConnectednessError>;

/// ErrorKind — coarse classification of [`ConnectednessError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    ModelFit,
    NumericalInstability,
    Cancelled,
    Execution,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectednessError {
    // ---- Configuration ----
    InvalidBandwidth { bandwidth: usize, observations: Option<usize> },
    InvalidSignificance { significance: f64 },
    InvalidCausalityThreshold { k: f64 },
    InvalidLagOrder { lags: usize },
    InvalidHorizon { horizon: usize },
    InvalidThreads { threads: usize },
    InvalidDataset { reason: String },

    // ---- Computation ----
    ModelFit(VarError),
    Causality(GrangerError),
    Network(NetworkError),
    Pca(PcaError),
    Window { window: usize, source: Box<ConnectednessError> },

    // ---- Run control ----
    Cancelled,
    WorkerPool { reason: String },
    TaskLost { window: usize },
}

impl ConnectednessError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConnectednessError::InvalidBandwidth { .. }
            | ConnectednessError::InvalidSignificance { .. }
            | ConnectednessError::InvalidCausalityThreshold { .. }
            | ConnectednessError::InvalidLagOrder { .. }
            | ConnectednessError::InvalidHorizon { .. }
            | ConnectednessError::InvalidThreads { .. }
            | ConnectednessError::InvalidDataset { .. } => ErrorKind::Configuration,
            ConnectednessError::ModelFit(VarError::InvalidLagOrder { .. })
            | ConnectednessError::ModelFit(VarError::InvalidHorizon { .. }) => ErrorKind::Configuration,
            ConnectednessError::ModelFit(_) | ConnectednessError::Causality(_) => ErrorKind::ModelFit,
            ConnectednessError::Network(NetworkError::Causality { .. }) => ErrorKind::ModelFit,
            ConnectednessError::Network(err) if err.is_numerical() => ErrorKind::NumericalInstability,
            ConnectednessError::Network(NetworkError::InvalidSignificance { .. })
            | ConnectednessError::Network(NetworkError::InvalidPartition { .. })
            | ConnectednessError::Network(NetworkError::PartitionSizeMismatch { .. }) => {
                ErrorKind::Configuration
            }
            ConnectednessError::Network(_) => ErrorKind::NumericalInstability,
            ConnectednessError::Pca(_) => ErrorKind::NumericalInstability,
            ConnectednessError::Window { source, .. } => source.kind(),
            ConnectednessError::Cancelled => ErrorKind::Cancelled,
            ConnectednessError::WorkerPool { .. } | ConnectednessError::TaskLost { .. } => ErrorKind::Execution,
        }
    }

    /// Attach the window index to a task failure.
    pub fn in_window(self, window: usize) -> Self {
        match self {
            ConnectednessError::Window { .. } | ConnectednessError::Cancelled => self,
            other => ConnectednessError::Window { window, source: Box::new(other) },
        }
    }
}

impl std::error::Error for ConnectednessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectednessError::ModelFit(err) => Some(err),
            ConnectednessError::Causality(err) => Some(err),
            ConnectednessError::Network(err) => Some(err),
            ConnectednessError::Pca(err) => Some(err),
            ConnectednessError::Window { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConnectednessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectednessError::InvalidBandwidth { bandwidth, observations: None } => {
                write!(f, "Bandwidth must be at least 30, got {bandwidth}.")
            }
            ConnectednessError::InvalidBandwidth { bandwidth, observations: Some(t) } => {
                write!(f, "Bandwidth {bandwidth} exceeds the {t} available observations.")
            }
            ConnectednessError::InvalidSignificance { significance } => {
                write!(f, "Significance must lie in (0, 0.20], got {significance}.")
            }
            ConnectednessError::InvalidCausalityThreshold { k } => {
                write!(f, "Causality threshold k must lie in (0, 0.20], got {k}.")
            }
            ConnectednessError::InvalidLagOrder { lags } => {
                write!(f, "VAR lag order must lie in [1, 5], got {lags}.")
            }
            ConnectednessError::InvalidHorizon { horizon } => {
                write!(f, "FEVD horizon must lie in [1, 15], got {horizon}.")
            }
            ConnectednessError::InvalidThreads { threads } => {
                write!(f, "Worker thread count must be positive, got {threads}.")
            }
            ConnectednessError::InvalidDataset { reason } => write!(f, "Invalid dataset: {reason}"),
            ConnectednessError::ModelFit(err) => write!(f, "Model fit failed: {err}"),
            ConnectednessError::Causality(err) => write!(f, "Causality test failed: {err}"),
            ConnectednessError::Network(err) => write!(f, "Network computation failed: {err}"),
            ConnectednessError::Pca(err) => write!(f, "PCA failed: {err}"),
            ConnectednessError::Window { window, source } => write!(f, "Window {window}: {source}"),
            ConnectednessError::Cancelled => write!(f, "Run cancelled before completion."),
            ConnectednessError::WorkerPool { reason } => write!(f, "Worker pool error: {reason}"),
            ConnectednessError::TaskLost { window } => {
                write!(f, "Result channel closed before window {window} reported back.")
            }
        }
    }
}

impl From<VarError> for ConnectednessError {
    fn from(err: VarError) -> Self {
        ConnectednessError::ModelFit(err)
    }
}

impl From<GrangerError> for ConnectednessError {
    fn from(err: GrangerError) -> Self {
        ConnectednessError::Causality(err)
    }
}

impl From<NetworkError> for ConnectednessError {
    fn from(err: NetworkError) -> Self {
        ConnectednessError::Network(err)
    }
}

impl From<PcaError> for ConnectednessError {
    fn from(err: PcaError) -> Self {
        ConnectednessError::Pca(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<ConnectednessError> for pyo3::PyErr {
    fn from(err: ConnectednessError) -> pyo3::PyErr {
        pyo3::exceptions::PyValueError::new_err(err.to_string())
    }
}
