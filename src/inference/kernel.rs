//! inference::kernel — HAC tapers and the Andrews plug-in bandwidth.
//!
//! Purpose
//! -------
//! Weight score autocovariances by lag and choose how many lags a robust
//! Granger regression should include when the caller does not fix one.
//!
//! Key behaviors
//! -------------
//! - [`KernelType::weight`] evaluates the taper at `x = ℓ/(L+1)`.
//! - [`KernelType::optimal_bandwidth`] fits an AR(1) to every non-constant
//!   score column with `arima`, combines them into the Andrews `α(q)`, and
//!   maps it to `L = c · (n α)^{1/(2q+1)}`. Any failure (near unit root,
//!   failed fit, vanishing scale) falls back to `round(n^{1/4})`.
use crate::{
    inference::errors::{InferenceError, InferenceResult},
    numerical_stability::{GENERAL_TOL, STATIONARITY_MARGIN, ZERO_VARIANCE_TOL},
};
use arima::estimate;
use ndarray::{ArrayView1, ArrayView2};
use std::f64::consts::PI;

/// Taper family for long-run covariances.
///
/// - `IID`: lag 0 only (White).
/// - `Bartlett`: triangular Newey–West weights.
/// - `Parzen`: cubic, compact support.
/// - `QuadraticSpectral`: infinite support, Andrews' optimal taper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelType {
    IID,
    Bartlett,
    Parzen,
    QuadraticSpectral,
}

/// Andrews plug-in constants: characteristic exponent `q`, scale `c` and
/// rate `1/(2q+1)`.
struct PlugInRule {
    order: u8,
    scale: f64,
    rate: f64,
}

impl KernelType {
    /// Weight `w(x)`; symmetric in `x`.
    pub fn weight(&self, x: f64) -> f64 {
        let a = x.abs();
        match self {
            KernelType::IID => f64::from(u8::from(x == 0.0)),
            KernelType::Bartlett if a <= 1.0 => 1.0 - a,
            KernelType::Parzen if a <= 0.5 => 1.0 - 6.0 * a * a * (1.0 - a),
            KernelType::Parzen if a <= 1.0 => 2.0 * (1.0 - a).powi(3),
            KernelType::Bartlett | KernelType::Parzen => 0.0,
            KernelType::QuadraticSpectral if x == 0.0 => 1.0,
            KernelType::QuadraticSpectral => {
                let z = 6.0 * PI * x / 5.0;
                3.0 / (z * z) * (z.sin() / z - z.cos())
            }
        }
    }

    fn plug_in_rule(&self) -> Option<PlugInRule> {
        match self {
            KernelType::IID => None,
            KernelType::Bartlett => Some(PlugInRule { order: 1, scale: 1.1447, rate: 1.0 / 3.0 }),
            KernelType::Parzen => Some(PlugInRule { order: 2, scale: 2.6614, rate: 1.0 / 5.0 }),
            KernelType::QuadraticSpectral => Some(PlugInRule { order: 2, scale: 1.3221, rate: 1.0 / 5.0 }),
        }
    }

    /// Plug-in bandwidth for an `n×k` score matrix; `0` for `IID`.
    ///
    /// The caller caps the result at `n − 1`.
    pub fn optimal_bandwidth(&self, scores: ArrayView2<f64>) -> usize {
        let Some(rule) = self.plug_in_rule() else {
            return 0;
        };
        let n = scores.nrows() as f64;
        match andrews_alpha(scores, rule.order) {
            Ok(alpha) => (rule.scale * (n * alpha).powf(rule.rate)).round() as usize,
            Err(_) => n.powf(0.25).round() as usize,
        }
    }
}

/// Andrews `α(q)` pooled over the AR(1) fits of every column.
///
/// Errors
/// ------
/// - `InferenceError::NearUnitRoot` when `|φ| ≥ 1 − STATIONARITY_MARGIN`
///   or `φ` is not finite.
/// - `InferenceError::UnsupportedKernelOrder` for `q ∉ {1, 2}`.
/// - `InferenceError::DegenerateBandwidthScale` when the pooled
///   denominator vanishes.
/// - `InferenceError::Ar1Fit` when `arima` rejects a column.
///
/// Constant columns carry no autocorrelation and are skipped.
fn andrews_alpha(scores: ArrayView2<f64>, order: u8) -> InferenceResult<f64> {
    let (mut num, mut den) = (0.0, 0.0);
    for column in scores.columns() {
        if column.var(0.0) <= ZERO_VARIANCE_TOL {
            continue;
        }
        let (phi, sigma2) = ar1(column)?;
        if !(phi.abs() < 1.0 - STATIONARITY_MARGIN) {
            return Err(InferenceError::NearUnitRoot { phi });
        }
        let s4 = sigma2 * sigma2;
        let core = 4.0 * phi * phi * s4;
        num += match order {
            1 => core / ((1.0 - phi).powi(6) * (1.0 + phi).powi(2)),
            2 => core / (1.0 - phi).powi(8),
            _ => return Err(InferenceError::UnsupportedKernelOrder { order }),
        };
        den += s4 / (1.0 - phi * phi).powi(4);
    }
    if den < GENERAL_TOL {
        return Err(InferenceError::DegenerateBandwidthScale { denominator: den });
    }
    Ok(num / den)
}

/// `xₜ = c + φ xₜ₋₁ + uₜ` via `arima`; returns `(φ, σ²)` with
/// `σ² = Σ uₜ² / (m − 1)` over the `m` fitted residuals.
fn ar1(series: ArrayView1<f64>) -> InferenceResult<(f64, f64)> {
    let n = series.len();
    if n < 3 {
        return Err(InferenceError::InsufficientObservations { observations: n, regressors: 2 });
    }
    let values = series.to_vec();
    let coeff = estimate::fit(&values, 1, 0, 0)?;
    let (intercept, phi) = (coeff[0], coeff[1]);
    let residuals = estimate::residuals(&values, intercept, Some(&[phi]), None)?;
    let sigma2 = residuals.iter().map(|u| u * u).sum::<f64>() / (residuals.len() - 1) as f64;
    Ok((phi, sigma2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array1, Array2, array};
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    #[test]
    // Purpose
    // -------
    // Tapers equal one at the origin, vanish outside their support, and
    // hit known interior values.
    fn kernel_weights_follow_their_definitions() {
        for kernel in [KernelType::IID, KernelType::Bartlett, KernelType::Parzen, KernelType::QuadraticSpectral] {
            assert_eq!(kernel.weight(0.0), 1.0, "{kernel:?}");
        }
        assert_eq!(KernelType::IID.weight(0.2), 0.0);
        assert_relative_eq!(KernelType::Bartlett.weight(-0.4), 0.6);
        assert_eq!(KernelType::Bartlett.weight(1.2), 0.0);
        assert_relative_eq!(KernelType::Parzen.weight(0.5), 0.25, epsilon = 1e-12);
        assert_relative_eq!(KernelType::Parzen.weight(0.8), 2.0 * 0.2_f64.powi(3), epsilon = 1e-12);
        assert_eq!(KernelType::Parzen.weight(1.1), 0.0);
        let qs = KernelType::QuadraticSpectral.weight(0.5);
        assert!(qs > 0.0 && qs < 1.0, "qs = {qs}");
    }

    #[test]
    // Purpose
    // -------
    // The AR(1) helper recovers φ and the innovation variance.
    //
    // Given
    // -----
    // - xₜ = 0.1 + 0.4 xₜ₋₁ + uₜ, uₜ i.i.d. N(0, 0.25), n = 2000, seeded.
    //
    // Expect
    // ------
    // - φ̂ within 0.08 of 0.4 and σ̂² within 0.05 of 0.25.
    fn ar1_recovers_persistence() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(41);
        let shocks = Normal::new(0.0, 0.5).expect("valid normal");
        let mut x = vec![0.0_f64];
        for t in 1..2000 {
            x.push(0.1 + 0.4 * x[t - 1] + shocks.sample(&mut rng));
        }

        // Act
        let (phi, sigma2) = ar1(Array1::from(x).view()).expect("AR(1) fit");

        // Assert
        assert!((phi - 0.4).abs() < 0.08, "phi = {phi}");
        assert!((sigma2 - 0.25).abs() < 0.05, "sigma2 = {sigma2}");
    }

    #[test]
    // Purpose
    // -------
    // Degenerate inputs use the n^{1/4} fallback; IID never adds lags.
    //
    // Given
    // -----
    // - A constant score column of length 81 (no autocorrelation to fit).
    //
    // Expect
    // ------
    // - round(81^{1/4}) = 3 for every plug-in kernel, 0 for IID.
    fn optimal_bandwidth_falls_back_for_degenerate_scores() {
        let flat = Array2::<f64>::from_elem((81, 1), 0.7);
        assert_eq!(KernelType::Bartlett.optimal_bandwidth(flat.view()), 3);
        assert_eq!(KernelType::QuadraticSpectral.optimal_bandwidth(flat.view()), 3);
        assert_eq!(KernelType::IID.optimal_bandwidth(flat.view()), 0);
    }

    #[test]
    // Purpose
    // -------
    // Near-white scores get a short plug-in bandwidth.
    fn optimal_bandwidth_is_small_for_weakly_dependent_scores() {
        let g = array![[0.3], [-0.1], [0.4], [-0.2], [0.1], [0.0], [0.25], [-0.3], [0.2], [0.05], [-0.15], [0.1]];
        let bw = KernelType::Bartlett.optimal_bandwidth(g.view());
        assert!(bw <= 12, "bw = {bw}");
    }
}
