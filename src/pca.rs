//! pca — principal component analysis of return matrices.
//!
//! Purpose
//! -------
//! Provide the per-window and whole-sample PCA summaries attached to the
//! connectedness results: loadings, explained-variance shares and scores.
//!
//! Key behaviors
//! -------------
//! - Columns are demeaned; the sample covariance uses `T − 1`.
//! - Components come from a symmetric eigendecomposition (nalgebra) sorted
//!   by decreasing eigenvalue.
//! - Each component is signed so that its largest-magnitude loading is
//!   positive, making outputs comparable across windows.
//! - `explained` is in percent; a zero-variance input gives all zeros.
//!
//! Invariants & assumptions
//! ------------------------
//! - `coefficients` is `N×N` with one component per column.
//! - `scores = X_c · coefficients` is `T×N`.

use crate::numerical_stability::{EIGEN_EPS, column_moments};
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2};

const EIGEN_MAX_ITER: usize = 10_000;

pub type PcaResult<T> = Result<T, PcaError>;

#[derive(Debug, Clone, PartialEq)]
pub enum PcaError {
    InsufficientObservations { rows: usize },
    EmptyData,
    NonFiniteData { row: usize, col: usize },
    EigenDecompositionFailed,
}

impl std::error::Error for PcaError {}

impl std::fmt::Display for PcaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PcaError::InsufficientObservations { rows } => {
                write!(f, "PCA needs at least 2 observations, got {rows}.")
            }
            PcaError::EmptyData => write!(f, "PCA input has no columns."),
            PcaError::NonFiniteData { row, col } => {
                write!(f, "PCA input has a non-finite value at row {row}, column {col}.")
            }
            PcaError::EigenDecompositionFailed => {
                write!(f, "Eigen decomposition of the covariance matrix did not converge.")
            }
        }
    }
}

/// PcaOutcome — loadings, explained variance (%) and scores.
#[derive(Debug, Clone, PartialEq)]
pub struct PcaOutcome {
    pub coefficients: Array2<f64>,
    pub explained: Array1<f64>,
    pub scores: Array2<f64>,
}

impl PcaOutcome {
    /// Run PCA on a `T×N` matrix (rows = observations).
    ///
    /// Errors
    /// ------
    /// - `PcaError::InsufficientObservations` when `T < 2`.
    /// - `PcaError::EmptyData` when `N = 0`.
    /// - `PcaError::NonFiniteData` at the first non-finite cell.
    /// - `PcaError::EigenDecompositionFailed` if the symmetric solver does
    ///   not converge.
    pub fn compute(data: ArrayView2<f64>) -> PcaResult<Self> {
        let (t, n) = data.dim();
        if t < 2 {
            return Err(PcaError::InsufficientObservations { rows: t });
        }
        if n == 0 {
            return Err(PcaError::EmptyData);
        }
        if let Some(((row, col), _)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(PcaError::NonFiniteData { row, col });
        }

        let (means, _) = column_moments(&data);
        let mut centered = data.to_owned();
        for (mut col, mean) in centered.columns_mut().into_iter().zip(means) {
            col -= mean;
        }
        let cov = centered.t().dot(&centered) / (t - 1) as f64;
        let cov = DMatrix::<f64>::from_fn(n, n, |i, j| cov[[i, j]]);
        let eigen =
            SymmetricEigen::try_new(cov, EIGEN_EPS, EIGEN_MAX_ITER).ok_or(PcaError::EigenDecompositionFailed)?;

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| eigen.eigenvalues[b].total_cmp(&eigen.eigenvalues[a]));

        let mut coefficients = Array2::<f64>::zeros((n, n));
        let mut variances = Array1::<f64>::zeros(n);
        for (k, &src) in order.iter().enumerate() {
            variances[k] = eigen.eigenvalues[src].max(0.0);
            let column = eigen.eigenvectors.column(src);
            let pivot = column.iter().copied().fold(0.0_f64, |acc, v| if v.abs() > acc.abs() { v } else { acc });
            let sign = if pivot < 0.0 { -1.0 } else { 1.0 };
            for i in 0..n {
                coefficients[[i, k]] = sign * column[i];
            }
        }

        let total = variances.sum();
        let explained = if total > 0.0 { variances * (100.0 / total) } else { Array1::zeros(n) };
        let scores = centered.dot(&coefficients);
        Ok(PcaOutcome { coefficients, explained, scores })
    }
}
