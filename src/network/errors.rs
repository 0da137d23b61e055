//! network::errors — error types for adjacency construction and graph metrics.
//!
//! Purpose
//! -------
//! Describe failures of the network layer: malformed adjacency matrices,
//! invalid group partitions, pairwise causality tests that could not be run,
//! and linear-algebra breakdowns inside the centrality measures.
//!
//! Conventions
//! -----------
//! - `SingularKatzSystem` and `EigenDecompositionFailed` are numerical
//!   instabilities; everything else is an input problem.

use crate::statistical_tests::errors::GrangerError;

pub type NetworkResult<T> = Result<T, NetworkError>;

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkError {
    // ---- Adjacency shape / content ----
    EmptyMatrix,
    NotSquare { rows: usize, cols: usize },
    NonFiniteEntry { row: usize, col: usize },

    // ---- Group partition ----
    InvalidPartition { boundaries: Vec<usize>, entities: usize },
    PartitionSizeMismatch { partition: usize, entities: usize },

    // ---- Pairwise tests ----
    InvalidSignificance { significance: f64 },
    Causality { cause: usize, effect: usize, source: GrangerError },

    // ---- Numerical ----
    SingularKatzSystem,
    EigenDecompositionFailed,
}

impl NetworkError {
    /// Whether this error stems from a numerical breakdown rather than bad input.
    pub fn is_numerical(&self) -> bool {
        matches!(self, NetworkError::SingularKatzSystem | NetworkError::EigenDecompositionFailed)
    }
}

impl std::error::Error for NetworkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetworkError::Causality { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl std::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::EmptyMatrix => write!(f, "Adjacency matrix is empty."),
            NetworkError::NotSquare { rows, cols } => {
                write!(f, "Adjacency matrix must be square, got {rows}x{cols}.")
            }
            NetworkError::NonFiniteEntry { row, col } => {
                write!(f, "Adjacency matrix has a non-finite entry at ({row}, {col}).")
            }
            NetworkError::InvalidPartition { boundaries, entities } => write!(
                f,
                "Group boundaries {boundaries:?} must be strictly increasing and lie in [1, {entities})."
            ),
            NetworkError::PartitionSizeMismatch { partition, entities } => write!(
                f,
                "Group partition covers {partition} entities but the network has {entities}."
            ),
            NetworkError::InvalidSignificance { significance } => {
                write!(f, "Significance level must lie in (0, 1), got {significance}.")
            }
            NetworkError::Causality { cause, effect, source } => {
                write!(f, "Granger test {cause} -> {effect} failed: {source}")
            }
            NetworkError::SingularKatzSystem => {
                write!(f, "Katz system (I - alpha A) is singular.")
            }
            NetworkError::EigenDecompositionFailed => {
                write!(f, "Eigen decomposition of the adjacency matrix did not converge.")
            }
        }
    }
}
