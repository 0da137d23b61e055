//! statistical_tests::validation — shared input guards for pairwise tests.
//!
//! Purpose
//! -------
//! Centralize the checks every pairwise causality test performs on its two
//! input series before building lagged regressions: equal lengths, enough
//! observations for the regression, and finite values.
//!
//! Invariants & assumptions
//! ------------------------
//! - Both series must have the same length `n`.
//! - `n ≥ MIN_GRANGER_OBSERVATIONS` so that the lag-1 regression on three
//!   regressors keeps at least one residual degree of freedom.
//! - All values must be finite.
//!
//! Testing notes
//! -------------
//! - Unit tests cover every error branch and a simple success path.

use crate::statistical_tests::errors::{GrangerError, GrangerResult};
use ndarray::ArrayView1;

/// Smallest series length accepted by the lag-1 Granger regression.
pub const MIN_GRANGER_OBSERVATIONS: usize = 5;

/// Validate a `(cause, effect)` pair for a lag-1 Granger regression.
///
/// Parameters
/// ----------
/// - `cause`: `ArrayView1<f64>`
///   Candidate causing series `x`.
/// - `effect`: `ArrayView1<f64>`
///   Candidate caused series `y`.
///
/// Returns
/// -------
/// `GrangerResult<()>`
///
/// Errors
/// ------
/// - `GrangerError::LengthMismatch` when lengths differ.
/// - `GrangerError::InsufficientData` when `n < MIN_GRANGER_OBSERVATIONS`.
/// - `GrangerError::InvalidData` for the first non-finite value found
///   (cause series first, then effect series).
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use systemic_connectedness::statistical_tests::validation::validate_pair;
/// let x = array![0.1, -0.2, 0.3, 0.0, 0.4];
/// let y = array![0.0, 0.1, -0.1, 0.2, 0.3];
/// assert!(validate_pair(x.view(), y.view()).is_ok());
/// ```
pub fn validate_pair(cause: ArrayView1<f64>, effect: ArrayView1<f64>) -> GrangerResult<()> {
    if cause.len() != effect.len() {
        return Err(GrangerError::LengthMismatch { cause: cause.len(), effect: effect.len() });
    }
    if cause.len() < MIN_GRANGER_OBSERVATIONS {
        return Err(GrangerError::InsufficientData {
            len: cause.len(),
            required: MIN_GRANGER_OBSERVATIONS,
        });
    }
    check_finite(cause)?;
    check_finite(effect)
}

fn check_finite(series: ArrayView1<f64>) -> GrangerResult<()> {
    match series.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(GrangerError::InvalidData { index, value }),
        None => Ok(()),
    }
}
