//! Numerical stability constants and column guards.
//!
//! Provides the shared tolerances used across estimation, inference and
//! network code, together with the two column-level guards applied to return
//! windows before any regression runs:
//!
//! - [`standardize_columns`]: z-score every column; degenerate (zero-variance)
//!   columns are zero-filled instead of divided by ~0.
//! - [`jitter_degenerate_columns`]: add a tiny, reproducible perturbation to
//!   zero-variance columns so a VAR residual covariance stays invertible.
//!
//! # Provided items
//! - [`GENERAL_TOL`]: generic "numerically zero" threshold for denominators.
//! - [`EIGEN_EPS`]: eigenvalues at or below this magnitude are treated as zero.
//! - [`STATIONARITY_MARGIN`]: strict-inequality buffer for |φ| < 1 checks.
//! - [`ZERO_VARIANCE_TOL`]: sample variance below which a column is degenerate.
//! - [`JITTER_SCALE`]: half-width of the uniform jitter added to such columns.
//!
//! Column order and entity identity are never changed by these helpers.
use ndarray::{Array2, ArrayView2, Axis};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// Generic tolerance for denominators and pivots.
pub const GENERAL_TOL: f64 = 1e-12;

/// Eigenvalues with magnitude at most this value are treated as zero.
pub const EIGEN_EPS: f64 = 1e-10;

/// Safety margin for strict stationarity (|φ| ≤ 1 − margin is required).
pub const STATIONARITY_MARGIN: f64 = 1e-6;

/// Sample variance below which a column is considered constant.
pub const ZERO_VARIANCE_TOL: f64 = 1e-20;

/// Half-width of the uniform jitter added to constant columns.
pub const JITTER_SCALE: f64 = 1e-8;

/// Seed for the jitter generator; fixed so identical inputs give identical fits.
const JITTER_SEED: u64 = 0x5EED_C011_EC7D;

/// Sample mean and unbiased variance of every column.
///
/// Returns `(means, variances)`; for a single-row input the variance is 0.
pub fn column_moments(data: &ArrayView2<f64>) -> (Vec<f64>, Vec<f64>) {
    let t = data.nrows();
    let mut means = Vec::with_capacity(data.ncols());
    let mut variances = Vec::with_capacity(data.ncols());
    for col in data.axis_iter(Axis(1)) {
        let mean = if t == 0 { 0.0 } else { col.sum() / t as f64 };
        let var = if t < 2 {
            0.0
        } else {
            col.iter().map(|&v| (v - mean) * (v - mean)).sum::<f64>() / (t - 1) as f64
        };
        means.push(mean);
        variances.push(var);
    }
    (means, variances)
}

/// Standardize each column to zero mean and unit variance.
///
/// Parameters
/// ----------
/// - `data`: `&ArrayView2<f64>`
///   `T×N` window (rows = time, columns = entities).
///
/// Returns
/// -------
/// `Array2<f64>`
///   A new `T×N` matrix. Columns whose sample variance is below
///   [`ZERO_VARIANCE_TOL`] are returned as all zeros.
///
/// Notes
/// -----
/// - Uses the unbiased (`T−1`) variance, matching the usual z-score.
pub fn standardize_columns(data: &ArrayView2<f64>) -> Array2<f64> {
    let (means, variances) = column_moments(data);
    let mut out = Array2::<f64>::zeros(data.raw_dim());
    for (j, mut col) in out.axis_iter_mut(Axis(1)).enumerate() {
        if variances[j] < ZERO_VARIANCE_TOL {
            continue;
        }
        let sd = variances[j].sqrt();
        for (dst, &src) in col.iter_mut().zip(data.column(j).iter()) {
            *dst = (src - means[j]) / sd;
        }
    }
    out
}

/// Perturb zero-variance columns with reproducible uniform noise.
///
/// Returns the (possibly) modified copy together with the indices of the
/// columns that were jittered. Non-degenerate columns are copied unchanged.
pub fn jitter_degenerate_columns(data: &ArrayView2<f64>) -> (Array2<f64>, Vec<usize>) {
    let (_, variances) = column_moments(data);
    let mut out = data.to_owned();
    let mut touched = Vec::new();
    let mut rng = StdRng::seed_from_u64(JITTER_SEED);
    for (j, var) in variances.iter().enumerate() {
        if *var >= ZERO_VARIANCE_TOL {
            continue;
        }
        for v in out.column_mut(j).iter_mut() {
            *v += rng.random_range(-JITTER_SCALE..JITTER_SCALE);
        }
        touched.push(j);
    }
    (out, touched)
}
