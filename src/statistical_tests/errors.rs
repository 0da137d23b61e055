//! statistical_tests::errors — error types for pairwise causality tests.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias for the Granger-causality test and
//! its validation helpers, so that malformed inputs and degenerate regressions
//! surface as structured values rather than panics.
//!
//! Key behaviors
//! -------------
//! - Define [`GrangerResult`] and [`GrangerError`] as the canonical result
//!   and error types of the statistical-test subtree.
//! - Attach human-readable `Display` messages to each variant.
//! - Wrap regression failures from the inference layer via
//!   `From<InferenceError>`, so `?` works across the boundary.
//!
//! Conventions
//! -----------
//! - Indices are 0-based; series lengths refer to the raw (unlagged) input.
//! - Error messages are phrased in terms of domain constraints
//!   ("needs at least 4 observations") rather than low-level details.
//!
//! Testing notes
//! -------------
//! - Unit tests verify that payloads are embedded in `Display` messages and
//!   that inference errors convert into the wrapping variant.

use crate::inference::errors::InferenceError;

pub type GrangerResult<T> = Result<T, GrangerError>;

/// GrangerError — error conditions for the Granger-causality test.
///
/// Variants
/// --------
/// - `InsufficientData { len, required }`
///   Too few observations to fit `yₜ ~ 1 + yₜ₋₁ + xₜ₋₁` with one residual
///   degree of freedom.
/// - `LengthMismatch { cause, effect }`
///   The two series have different lengths.
/// - `InvalidData { index, value }`
///   A non-finite observation at `index`.
/// - `InvalidVariance { variance }`
///   The estimated variance of the tested coefficient is not strictly
///   positive and finite, so no statistic can be formed.
/// - `InvalidDistribution { freedom }`
///   The reference distribution could not be built for these degrees of
///   freedom.
/// - `Regression(InferenceError)`
///   The underlying OLS fit failed (e.g. a singular design).
#[derive(Debug, Clone, PartialEq)]
pub enum GrangerError {
    //------ Input validation errors ------
    InsufficientData { len: usize, required: usize },
    LengthMismatch { cause: usize, effect: usize },
    InvalidData { index: usize, value: f64 },

    //------ Estimation errors ------
    InvalidVariance { variance: f64 },
    InvalidDistribution { freedom: f64 },
    Regression(InferenceError),
}

impl std::error::Error for GrangerError {}

impl std::fmt::Display for GrangerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GrangerError::InsufficientData { len, required } => {
                write!(f, "Granger test needs at least {required} observations, got {len}.")
            }
            GrangerError::LengthMismatch { cause, effect } => {
                write!(f, "Cause series has {cause} observations but effect series has {effect}.")
            }
            GrangerError::InvalidData { index, value } => {
                write!(f, "Invalid data value {value} at index {index}. Must be a finite number.")
            }
            GrangerError::InvalidVariance { variance } => {
                write!(f, "Coefficient variance {variance} is not positive and finite.")
            }
            GrangerError::InvalidDistribution { freedom } => {
                write!(f, "Cannot build reference distribution with {freedom} degrees of freedom.")
            }
            GrangerError::Regression(err) => write!(f, "Granger regression failed: {err}"),
        }
    }
}

impl From<InferenceError> for GrangerError {
    fn from(err: InferenceError) -> Self {
        GrangerError::Regression(err)
    }
}
