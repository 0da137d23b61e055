//! inference::hac — long-run covariance of regression scores.
//!
//! Purpose
//! -------
//! Estimate the long-run covariance `S` of the average OLS score
//! `ḡ = (1/n) ∑ xₜ eₜ`, the middle term of the sandwich behind robust
//! Granger p-values. Return series in a window are heteroskedastic and
//! mildly autocorrelated, so `S` sums kernel-weighted score
//! autocovariances:
//!
//! ```text
//! S = Γ̂(0) + ∑_{ℓ=1}^{L} w(ℓ/(L+1)) · (Γ̂(ℓ) + Γ̂(ℓ)ᵀ)
//! Γ̂(ℓ) = c(ℓ) · ∑_{t>ℓ} gₜ gₜ₋ℓᵀ,    c(ℓ) = 1/(n−ℓ) or 1/n
//! ```
//!
//! Invariants & assumptions
//! ------------------------
//! - `scores` is `n×k`, rows = observations.
//! - The effective bandwidth never exceeds `n − 1`; with `L = 0` the
//!   estimate is the outer product of gradients `(1/n) GᵀG` (White).
//! - `n = 0` yields a `k×k` zero matrix.
use crate::inference::kernel::KernelType;
use ndarray::{Array2, ArrayView2, Axis, CowArray, Ix2, s};

/// HACOptions — how the robust Granger test weights score autocovariances.
///
/// Fields
/// ------
/// - `kernel`: taper applied to lag `ℓ` at argument `ℓ/(L+1)`.
/// - `bandwidth`: fixed `L`, or `None` for the Andrews plug-in rule of
///   [`KernelType::optimal_bandwidth`].
/// - `center`: demean score columns first.
/// - `small_sample_correction`: divide lag-`ℓ` products by `n − ℓ` instead
///   of `n`.
///
/// The `Default` (Bartlett, plug-in bandwidth, uncentered, corrected) is the
/// Newey–West setup used for robust runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HACOptions {
    pub kernel: KernelType,
    pub bandwidth: Option<usize>,
    pub center: bool,
    pub small_sample_correction: bool,
}

impl HACOptions {
    /// Examples
    /// --------
    /// ```rust
    /// # use systemic_connectedness::inference::{HACOptions, KernelType};
    /// let white = HACOptions::new(Some(0), KernelType::IID, false, false);
    /// assert_eq!(white.bandwidth, Some(0));
    /// ```
    pub fn new(
        bandwidth: Option<usize>, kernel: KernelType, center: bool, small_sample_correction: bool,
    ) -> HACOptions {
        HACOptions { kernel, bandwidth, center, small_sample_correction }
    }

    /// Lag truncation actually used for `scores`: the requested or plug-in
    /// bandwidth, capped at `n − 1`.
    pub fn effective_bandwidth(&self, scores: ArrayView2<f64>) -> usize {
        let max_lag = scores.nrows().saturating_sub(1);
        self.bandwidth.unwrap_or_else(|| self.kernel.optimal_bandwidth(scores)).min(max_lag)
    }

    fn lag_scale(&self, n: usize, lag: usize) -> f64 {
        if self.small_sample_correction { 1.0 / (n - lag) as f64 } else { 1.0 / n as f64 }
    }
}

impl Default for HACOptions {
    fn default() -> Self {
        HACOptions::new(None, KernelType::Bartlett, false, true)
    }
}

/// Long-run covariance `S` of the average score (`k×k`, symmetric).
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use systemic_connectedness::inference::{HACOptions, KernelType, long_run_covariance};
/// let scores = array![[0.2, -0.1], [0.1, 0.3], [-0.4, 0.2]];
/// let s = long_run_covariance(&HACOptions::new(Some(1), KernelType::Bartlett, false, true), scores.view());
/// assert_eq!(s.dim(), (2, 2));
/// ```
pub fn long_run_covariance(opts: &HACOptions, scores: ArrayView2<f64>) -> Array2<f64> {
    let (n, k) = scores.dim();
    if n == 0 {
        return Array2::zeros((k, k));
    }

    let centered: CowArray<f64, Ix2> = match scores.mean_axis(Axis(0)) {
        Some(means) if opts.center => (&scores - &means).into(),
        _ => scores.into(),
    };
    let g = centered.view();

    let bandwidth = opts.effective_bandwidth(g);
    let mut s = g.t().dot(&g) / n as f64;
    for lag in 1..=bandwidth {
        let w = opts.kernel.weight(lag as f64 / (bandwidth + 1) as f64);
        if w == 0.0 {
            continue;
        }
        let gamma = lagged_cross_product(g, lag) * opts.lag_scale(n, lag);
        s.scaled_add(w, &gamma);
        s.scaled_add(w, &gamma.t());
    }
    s
}

/// `∑_{t≥lag} gₜ gₜ₋lagᵀ`.
fn lagged_cross_product(g: ArrayView2<f64>, lag: usize) -> Array2<f64> {
    let n = g.nrows();
    g.slice(s![lag.., ..]).t().dot(&g.slice(s![..n - lag, ..]))
}
