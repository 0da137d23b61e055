//! var::errors — error types for VAR estimation and variance decomposition.
//!
//! Purpose
//! -------
//! Report every way a VAR(p) fit or an FEVD can fail: bad lag/horizon
//! settings, malformed or too-short input windows, and numerical breakdown
//! of the least-squares or covariance factorization steps.
//!
//! Conventions
//! -----------
//! - Row/column indices refer to the window matrix (rows = time,
//!   columns = entities) and are 0-based.
//! - Regression failures that are not better described by a dedicated
//!   variant are wrapped as [`VarError::Regression`].

use crate::inference::errors::InferenceError;

pub type VarResult<T> = Result<T, VarError>;

/// VarError — failure modes of [`VarModel`](crate::var::VarModel) and
/// [`VarianceDecomposer`](crate::var::VarianceDecomposer).
#[derive(Debug, Clone, PartialEq)]
pub enum VarError {
    // ---- Configuration ----
    InvalidLagOrder { lags: usize },
    InvalidHorizon { horizon: usize },

    // ---- Input data ----
    EmptyData,
    NonFiniteData { row: usize, col: usize },
    InsufficientObservations { observations: usize, required: usize },
    ShapeMismatch { expected: (usize, usize), found: (usize, usize) },

    // ---- Numerical ----
    SingularDesign,
    NonPositiveDefiniteCovariance,
    Regression(InferenceError),
}

impl std::error::Error for VarError {}

impl std::fmt::Display for VarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarError::InvalidLagOrder { lags } => {
                write!(f, "VAR lag order must lie in [1, 5], got {lags}.")
            }
            VarError::InvalidHorizon { horizon } => {
                write!(f, "FEVD horizon must lie in [1, 15], got {horizon}.")
            }
            VarError::EmptyData => write!(f, "VAR input window has no rows or no columns."),
            VarError::NonFiniteData { row, col } => {
                write!(f, "Non-finite value at row {row}, column {col} of the VAR input window.")
            }
            VarError::InsufficientObservations { observations, required } => write!(
                f,
                "VAR fit needs more than {required} effective observations, got {observations}."
            ),
            VarError::ShapeMismatch { expected, found } => write!(
                f,
                "Matrix shape mismatch: expected {}x{}, found {}x{}.",
                expected.0, expected.1, found.0, found.1
            ),
            VarError::SingularDesign => {
                write!(f, "VAR design matrix is singular; lagged regressors are collinear.")
            }
            VarError::NonPositiveDefiniteCovariance => {
                write!(f, "VAR residual covariance is not positive definite.")
            }
            VarError::Regression(err) => write!(f, "VAR equation fit failed: {err}"),
        }
    }
}

impl From<InferenceError> for VarError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::SingularDesign => VarError::SingularDesign,
            InferenceError::InsufficientObservations { observations, regressors } => {
                VarError::InsufficientObservations { observations, required: regressors }
            }
            other => VarError::Regression(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // OLS failures map onto the dedicated VAR variants where one exists.
    fn var_error_from_inference_error_maps_variants() {
        // Arrange
        let singular = InferenceError::SingularDesign;
        let short = InferenceError::InsufficientObservations { observations: 4, regressors: 7 };
        let other = InferenceError::DegenerateBandwidthScale { denominator: 0.0 };

        // Act / Assert
        assert_eq!(VarError::from(singular), VarError::SingularDesign);
        assert_eq!(
            VarError::from(short),
            VarError::InsufficientObservations { observations: 4, required: 7 }
        );
        assert!(matches!(VarError::from(other), VarError::Regression(_)));
    }

    #[test]
    // Purpose
    // -------
    // Shape payloads are rendered as rows x cols.
    fn var_error_shape_mismatch_display() {
        let err = VarError::ShapeMismatch { expected: (2, 2), found: (3, 2) };
        assert_eq!(err.to_string(), "Matrix shape mismatch: expected 2x2, found 3x2.");
    }
}
