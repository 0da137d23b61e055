//! statistical_tests::granger — pairwise lag-1 Granger-causality test.
//!
//! Purpose
//! -------
//! Decide whether the past of a candidate cause series `x` helps predict an
//! effect series `y` beyond `y`'s own past. The causal adjacency builder runs
//! this test once per ordered entity pair inside every rolling window and
//! turns the p-value into a binary edge.
//!
//! Key behaviors
//! -------------
//! - Fit the unrestricted regression `yₜ = c + a yₜ₋₁ + b xₜ₋₁ + eₜ` by OLS
//!   on `t = 1..n−1` and test `H₀: b = 0`.
//! - Classical variant: `t = b̂ / se(b̂)` with `se` from `s² (XᵀX)⁻¹` and a
//!   two-sided Student-t p-value with `n − 1 − 3` degrees of freedom.
//! - Robust variant: Wald statistic `W = b̂² / V̂_bb` with `V̂` the HAC
//!   sandwich covariance, referred to a χ²(1) distribution.
//! - A constant lagged cause or lagged effect carries no information about
//!   `b`; the test then reports `stat = 0`, `p_value = 1` instead of a
//!   singular-design error. The same holds when the lagged cause is an
//!   exact affine copy of the lagged effect (e.g. duplicated entity
//!   columns), so one degenerate pair never aborts a network build.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are validated by [`validate_pair`] (equal lengths, at least
//!   `MIN_GRANGER_OBSERVATIONS`, finite values).
//! - `p_value ∈ [0, 1]` for every successful outcome.
//!
//! Conventions
//! -----------
//! - Argument order is `(cause, effect)`. An outcome with `p_value < α`
//!   is read as "cause Granger-causes effect at level α".
//!
//! Testing notes
//! -------------
//! - Unit tests cover a strongly lead-lag pair (tiny p-value in both
//!   variants), an independent pair, the degenerate constant and
//!   collinear cases, and validation propagation.

use crate::{
    inference::{errors::InferenceError, hac::HACOptions, ols::OlsFit},
    numerical_stability::ZERO_VARIANCE_TOL,
    statistical_tests::{
        errors::{GrangerError, GrangerResult},
        validation::validate_pair,
    },
};
use ndarray::{Array1, Array2, ArrayView1, s};
use statrs::distribution::{ChiSquared, ContinuousCDF, StudentsT};

/// Correlation gap below which lagged cause and effect count as collinear.
const COLLINEARITY_TOL: f64 = 1e-10;

/// Position of `xₜ₋₁` in the design `[1, yₜ₋₁, xₜ₋₁]`.
const CAUSE_COEF: usize = 2;

/// GrangerOptions — variance estimator used by the Granger test.
///
/// Fields
/// ------
/// - `robust`: `bool`
///   `false` for the classical OLS variance, `true` for the HAC sandwich.
/// - `hac`: `HACOptions`
///   Kernel/bandwidth settings, read only when `robust` is `true`.
#[derive(Debug, Clone, PartialEq)]
pub struct GrangerOptions {
    pub robust: bool,
    pub hac: HACOptions,
}

impl GrangerOptions {
    pub fn new(robust: bool, hac: HACOptions) -> Self {
        GrangerOptions { robust, hac }
    }

    /// Classical or robust test with the default HAC configuration.
    pub fn with_robust(robust: bool) -> Self {
        GrangerOptions { robust, hac: HACOptions::default() }
    }
}

impl Default for GrangerOptions {
    fn default() -> Self {
        GrangerOptions::with_robust(false)
    }
}

/// GrangerOutcome — test statistic and p-value for one ordered pair.
///
/// Fields
/// ------
/// - `stat`: `f64`
///   Student-t statistic (classical) or Wald χ²(1) statistic (robust).
/// - `p_value`: `f64`
///   p-value of `H₀: xₜ₋₁ does not help predict yₜ`.
/// - `coefficient`: `f64`
///   Estimated loading `b̂` on `xₜ₋₁` (0 in the degenerate case).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GrangerOutcome {
    stat: f64,
    p_value: f64,
    coefficient: f64,
}

impl GrangerOutcome {
    /// Run the lag-1 Granger-causality test of `cause → effect`.
    ///
    /// Parameters
    /// ----------
    /// - `cause`: `ArrayView1<f64>`
    ///   Candidate causing series `x`, length `n`.
    /// - `effect`: `ArrayView1<f64>`
    ///   Candidate caused series `y`, length `n`.
    /// - `opts`: `&GrangerOptions`
    ///   Classical vs robust variance selection.
    ///
    /// Returns
    /// -------
    /// `GrangerResult<GrangerOutcome>`
    ///
    /// Errors
    /// ------
    /// - Any [`validate_pair`] error.
    /// - `GrangerError::Regression` for OLS failures other than a singular
    ///   design (singular designs map to `p_value = 1`).
    /// - `GrangerError::InvalidVariance` when the variance of `b̂` is not
    ///   strictly positive (an exact in-sample fit).
    /// - `GrangerError::InvalidDistribution` if statrs rejects the degrees
    ///   of freedom.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::Array1;
    /// # use systemic_connectedness::statistical_tests::{GrangerOptions, GrangerOutcome};
    /// let x = Array1::from_iter((0..60).map(|t| ((t * 7 % 11) as f64) - 5.0));
    /// let mut y = Array1::<f64>::zeros(60);
    /// for t in 1..60 {
    ///     y[t] = 0.9 * x[t - 1] + 0.1 * (((t * 3) % 5) as f64 - 2.0);
    /// }
    /// let out = GrangerOutcome::granger_causality(x.view(), y.view(), &GrangerOptions::default()).unwrap();
    /// assert!(out.p_value() < 0.01);
    /// ```
    pub fn granger_causality(
        cause: ArrayView1<f64>, effect: ArrayView1<f64>, opts: &GrangerOptions,
    ) -> GrangerResult<Self> {
        validate_pair(cause, effect)?;
        let n = cause.len();

        let lagged_cause = cause.slice(s![..n - 1]);
        let lagged_effect = effect.slice(s![..n - 1]);
        if is_constant(lagged_cause) || is_constant(lagged_effect) || is_collinear(lagged_cause, lagged_effect) {
            return Ok(GrangerOutcome::no_causality());
        }

        let mut design = Array2::<f64>::ones((n - 1, 3));
        design.column_mut(1).assign(&lagged_effect);
        design.column_mut(CAUSE_COEF).assign(&lagged_cause);
        let response: Array1<f64> = effect.slice(s![1..]).to_owned();
        let fit = match OlsFit::fit(design.view(), response.view()) {
            Err(InferenceError::SingularDesign) => return Ok(GrangerOutcome::no_causality()),
            other => other?,
        };
        let coefficient = fit.beta[CAUSE_COEF];

        if opts.robust {
            let variance = fit.robust_covariance(&opts.hac)[[CAUSE_COEF, CAUSE_COEF]];
            check_variance(variance)?;
            let stat = coefficient * coefficient / variance;
            let chi2 = ChiSquared::new(1.0)
                .map_err(|_| GrangerError::InvalidDistribution { freedom: 1.0 })?;
            let p_value = chi2.sf(stat).clamp(0.0, 1.0);
            Ok(GrangerOutcome { stat, p_value, coefficient })
        } else {
            let variance = fit.classical_covariance()[[CAUSE_COEF, CAUSE_COEF]];
            check_variance(variance)?;
            let stat = coefficient / variance.sqrt();
            let freedom = fit.df_resid() as f64;
            let student = StudentsT::new(0.0, 1.0, freedom)
                .map_err(|_| GrangerError::InvalidDistribution { freedom })?;
            let p_value = (2.0 * student.sf(stat.abs())).clamp(0.0, 1.0);
            Ok(GrangerOutcome { stat, p_value, coefficient })
        }
    }

    fn no_causality() -> Self {
        GrangerOutcome { stat: 0.0, p_value: 1.0, coefficient: 0.0 }
    }

    pub fn stat(&self) -> f64 {
        self.stat
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    /// `true` when `p_value < significance`.
    pub fn is_significant(&self, significance: f64) -> bool {
        self.p_value < significance
    }
}

fn is_constant(series: ArrayView1<f64>) -> bool {
    let n = series.len() as f64;
    let mean = series.sum() / n;
    let var = series.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    var <= ZERO_VARIANCE_TOL
}

/// `|corr(a, b)| ≥ 1 − COLLINEARITY_TOL`; both inputs are non-constant.
fn is_collinear(a: ArrayView1<f64>, b: ArrayView1<f64>) -> bool {
    let n = a.len() as f64;
    let (ma, mb) = (a.sum() / n, b.sum() / n);
    let (mut sab, mut saa, mut sbb) = (0.0, 0.0, 0.0);
    for (&x, &y) in a.iter().zip(b.iter()) {
        sab += (x - ma) * (y - mb);
        saa += (x - ma) * (x - ma);
        sbb += (y - mb) * (y - mb);
    }
    sab.abs() >= (1.0 - COLLINEARITY_TOL) * (saa * sbb).sqrt()
}

fn check_variance(variance: f64) -> GrangerResult<()> {
    if variance.is_finite() && variance > 0.0 {
        Ok(())
    } else {
        Err(GrangerError::InvalidVariance { variance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::kernel::KernelType;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Detection of a strong lead-lag relation in both variance variants.
    // - No detection on independent noise.
    // - The constant and collinear conventions (p = 1).
    // - Error propagation from validation and the regression.
    // -------------------------------------------------------------------------

    fn noise(seed: u64, n: usize) -> Array1<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 1.0).expect("valid normal");
        Array1::from_iter((0..n).map(|_| normal.sample(&mut rng)))
    }

    fn lead_lag_pair(n: usize) -> (Array1<f64>, Array1<f64>) {
        let x = noise(7, n);
        let e = noise(11, n);
        let mut y = Array1::<f64>::zeros(n);
        for t in 1..n {
            y[t] = 0.8 * x[t - 1] + 0.3 * e[t];
        }
        (x, y)
    }

    #[test]
    // Purpose
    // -------
    // A series driven by the lagged cause is detected in both variants,
    // while the reverse direction is not.
    //
    // Given
    // -----
    // - yₜ = 0.8 xₜ₋₁ + 0.3 eₜ with independent Gaussian x and e, n = 200.
    //
    // Expect
    // ------
    // - p(x → y) < 1e-6 for classical and robust tests.
    // - p(y → x) > 0.01 for the classical test.
    fn granger_detects_lead_lag_relation() {
        // Arrange
        let (x, y) = lead_lag_pair(200);
        let robust = GrangerOptions::new(true, HACOptions::new(None, KernelType::Bartlett, false, true));

        // Act
        let classical = GrangerOutcome::granger_causality(x.view(), y.view(), &GrangerOptions::default())
            .expect("classical test");
        let hac = GrangerOutcome::granger_causality(x.view(), y.view(), &robust).expect("robust test");
        let reverse = GrangerOutcome::granger_causality(y.view(), x.view(), &GrangerOptions::default())
            .expect("reverse test");

        // Assert
        assert!(classical.p_value() < 1e-6, "classical p = {}", classical.p_value());
        assert!(hac.p_value() < 1e-6, "robust p = {}", hac.p_value());
        assert!((classical.coefficient() - 0.8).abs() < 0.1);
        assert!(reverse.p_value() > 0.01, "reverse p = {}", reverse.p_value());
    }

    #[test]
    // Purpose
    // -------
    // p-values stay inside [0, 1] and do not reject on independent noise.
    fn granger_independent_noise_is_not_significant() {
        // Arrange
        let x = noise(101, 250);
        let y = noise(202, 250);

        // Act
        let out = GrangerOutcome::granger_causality(x.view(), y.view(), &GrangerOptions::with_robust(true))
            .expect("robust test");

        // Assert
        assert!((0.0..=1.0).contains(&out.p_value()));
        assert!(!out.is_significant(0.001), "p = {}", out.p_value());
    }

    #[test]
    // Purpose
    // -------
    // A constant cause or effect yields p = 1 instead of a singular fit.
    fn granger_constant_series_reports_no_causality() {
        // Arrange
        let x = Array1::<f64>::from_elem(40, 0.5);
        let y = noise(3, 40);

        // Act
        let forward = GrangerOutcome::granger_causality(x.view(), y.view(), &GrangerOptions::default())
            .expect("degenerate cause");
        let backward = GrangerOutcome::granger_causality(y.view(), x.view(), &GrangerOptions::default())
            .expect("degenerate effect");

        // Assert
        assert_eq!(forward.p_value(), 1.0);
        assert_eq!(backward.p_value(), 1.0);
        assert!(!forward.is_significant(0.2));
    }

    #[test]
    // Purpose
    // -------
    // Validation failures propagate as `GrangerError`.
    fn granger_propagates_validation_errors() {
        // Arrange
        let x = noise(5, 30);
        let short = noise(6, 20);

        // Act
        let mismatch = GrangerOutcome::granger_causality(x.view(), short.view(), &GrangerOptions::default());

        // Assert
        assert_eq!(mismatch, Err(GrangerError::LengthMismatch { cause: 30, effect: 20 }));
    }

    #[test]
    // Purpose
    // -------
    // Duplicated or affinely rescaled series report no causality in both
    // variants instead of a singular-design error.
    //
    // Given
    // -----
    // - x and an identical copy of x.
    // - x and 2x − 1.
    //
    // Expect
    // ------
    // - `Ok` with `p_value = 1` and `coefficient = 0` for every case.
    fn granger_collinear_series_reports_no_causality() {
        // Arrange
        let x = noise(5, 30);
        let copy = x.clone();
        let rescaled = x.mapv(|v| 2.0 * v - 1.0);

        for opts in [GrangerOptions::default(), GrangerOptions::with_robust(true)] {
            // Act
            let same = GrangerOutcome::granger_causality(x.view(), copy.view(), &opts).expect("identical pair");
            let affine = GrangerOutcome::granger_causality(rescaled.view(), x.view(), &opts).expect("affine pair");

            // Assert
            assert_eq!(same.p_value(), 1.0);
            assert_eq!(affine.p_value(), 1.0);
            assert_eq!(same.coefficient(), 0.0);
        }
    }
}
