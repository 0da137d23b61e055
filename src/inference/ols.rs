//! inference::ols — least-squares fits with classical and HAC covariance.
//!
//! Purpose
//! -------
//! Provide the single linear-regression primitive used throughout the crate:
//! Granger regressions and the equation-by-equation VAR estimator both go
//! through [`OlsFit`].
//!
//! Key behaviors
//! -------------
//! - Solve the normal equations `XᵀX β = Xᵀy` through a Cholesky factor of
//!   `XᵀX` (nalgebra), rejecting rank-deficient designs with
//!   [`InferenceError::SingularDesign`] instead of returning garbage.
//! - Keep `(XᵀX)⁻¹`, residuals and per-observation scores `gₜ = xₜ eₜ`
//!   so that both covariance flavors can be formed after the fit.
//! - Classical covariance: `s² (XᵀX)⁻¹`, `s² = SSR / (n − k)`.
//! - Robust covariance: `n (XᵀX)⁻¹ S (XᵀX)⁻¹` where `S` is the HAC
//!   long-run covariance of the average score from [`long_run_covariance`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `design` is `n×k` (rows = observations) and `response` has length `n`.
//! - `n > k` is required so that `s²` has at least one degree of freedom.
//! - A Cholesky pivot `Lᵢᵢ² ≤ GENERAL_TOL · (XᵀX)ᵢᵢ` is treated as a
//!   singular direction.
//!
//! Conventions
//! -----------
//! - The design matrix is supplied by the caller, including any intercept
//!   column; this module never adds one implicitly.
//!
//! Testing notes
//! -------------
//! - Unit tests cover exact recovery on noiseless data, singular-design
//!   rejection, and agreement of IID-HAC and heteroskedasticity-free
//!   classical variances in large samples.
use crate::{
    inference::{
        errors::{InferenceError, InferenceResult},
        hac::{HACOptions, long_run_covariance},
    },
    numerical_stability::GENERAL_TOL,
};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// OlsFit — estimated coefficients and the pieces needed for inference.
///
/// Fields
/// ------
/// - `beta`: `Array1<f64>`
///   Coefficient vector of length `k`, ordered like the design columns.
/// - `residuals`: `Array1<f64>`
///   In-sample residuals `e = y − Xβ̂`.
/// - `xtx_inv`: `Array2<f64>`
///   `(XᵀX)⁻¹`, `k×k`.
/// - `scores`: `Array2<f64>`
///   `n×k` matrix with rows `xₜ eₜ`, used by the HAC estimator.
/// - `ssr`: `f64`
///   Sum of squared residuals.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub beta: Array1<f64>,
    pub residuals: Array1<f64>,
    pub xtx_inv: Array2<f64>,
    pub scores: Array2<f64>,
    pub ssr: f64,
}

impl OlsFit {
    /// Fit `response` on `design` by ordinary least squares.
    ///
    /// Parameters
    /// ----------
    /// - `design`: `ArrayView2<f64>`
    ///   `n×k` regressor matrix (include a column of ones for an intercept).
    /// - `response`: `ArrayView1<f64>`
    ///   Length-`n` dependent variable.
    ///
    /// Returns
    /// -------
    /// `InferenceResult<OlsFit>`
    ///
    /// Errors
    /// ------
    /// - `InferenceError::ShapeMismatch` when the row counts differ.
    /// - `InferenceError::InsufficientObservations` when `n ≤ k`.
    /// - `InferenceError::SingularDesign` when `XᵀX` is not numerically
    ///   positive definite.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use systemic_connectedness::inference::ols::OlsFit;
    /// let x = array![[1.0, 0.0], [1.0, 1.0], [1.0, 2.0], [1.0, 3.0]];
    /// let y = array![1.0, 3.0, 5.0, 7.0];
    /// let fit = OlsFit::fit(x.view(), y.view()).unwrap();
    /// assert!((fit.beta[1] - 2.0).abs() < 1e-10);
    /// ```
    pub fn fit(design: ArrayView2<f64>, response: ArrayView1<f64>) -> InferenceResult<Self> {
        let n = design.nrows();
        let k = design.ncols();
        if response.len() != n {
            return Err(InferenceError::ShapeMismatch {
                design_rows: n,
                response_rows: response.len(),
            });
        }
        if n <= k {
            return Err(InferenceError::InsufficientObservations { observations: n, regressors: k });
        }

        let xtx = design.t().dot(&design);
        let xty = design.t().dot(&response);
        let xtx_inv = invert_gram(&xtx)?;
        let beta = xtx_inv.dot(&xty);

        let residuals = &response - &design.dot(&beta);
        let ssr = residuals.iter().map(|e| e * e).sum::<f64>();
        let mut scores = design.to_owned();
        for (mut row, &e) in scores.rows_mut().into_iter().zip(residuals.iter()) {
            row *= e;
        }

        Ok(OlsFit { beta, residuals, xtx_inv, scores, ssr })
    }

    /// Number of observations used in the fit.
    pub fn nobs(&self) -> usize {
        self.residuals.len()
    }

    /// Residual degrees of freedom `n − k`.
    pub fn df_resid(&self) -> usize {
        self.nobs() - self.beta.len()
    }

    /// Classical covariance `s² (XᵀX)⁻¹` with `s² = SSR / (n − k)`.
    pub fn classical_covariance(&self) -> Array2<f64> {
        let s2 = self.ssr / self.df_resid() as f64;
        &self.xtx_inv * s2
    }

    /// HAC sandwich covariance `n (XᵀX)⁻¹ S (XᵀX)⁻¹`.
    ///
    /// `S` is built from the stored scores with the given [`HACOptions`]; with
    /// `KernelType::IID` this is White's heteroskedasticity-robust estimator.
    pub fn robust_covariance(&self, hac_opts: &HACOptions) -> Array2<f64> {
        let n = self.nobs() as f64;
        let s = long_run_covariance(hac_opts, self.scores.view());
        self.xtx_inv.dot(&s).dot(&self.xtx_inv) * n
    }
}

/// Invert a symmetric Gram matrix through its Cholesky factor.
fn invert_gram(xtx: &Array2<f64>) -> InferenceResult<Array2<f64>> {
    let k = xtx.nrows();
    let gram = DMatrix::<f64>::from_fn(k, k, |i, j| xtx[[i, j]]);
    let chol = gram.cholesky().ok_or(InferenceError::SingularDesign)?;
    let l = chol.l();
    for i in 0..k {
        let pivot = l[(i, i)] * l[(i, i)];
        if !pivot.is_finite() || pivot <= GENERAL_TOL * xtx[[i, i]].abs().max(GENERAL_TOL) {
            return Err(InferenceError::SingularDesign);
        }
    }
    let mut inv = Array2::<f64>::zeros((k, k));
    for j in 0..k {
        let mut e = DVector::<f64>::zeros(k);
        e[j] = 1.0;
        let col = chol.solve(&e);
        for i in 0..k {
            inv[[i, j]] = col[i];
        }
    }
    Ok(inv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::kernel::KernelType;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact coefficient recovery on noiseless linear data.
    // - Rejection of rank-deficient designs and undersized samples.
    // - Shape and symmetry of classical and robust covariances.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // OLS recovers the generating coefficients when there is no noise.
    //
    // Given
    // -----
    // - y = 0.5 + 2 x₁ − x₂ on five observations.
    //
    // Expect
    // ------
    // - β̂ ≈ [0.5, 2, −1] and SSR ≈ 0.
    fn ols_fit_recovers_noiseless_coefficients() {
        // Arrange
        let x = array![
            [1.0, 0.0, 1.0],
            [1.0, 1.0, 0.0],
            [1.0, 2.0, 3.0],
            [1.0, 3.0, 1.0],
            [1.0, 4.0, 2.0]
        ];
        let y = x.dot(&array![0.5, 2.0, -1.0]);

        // Act
        let fit = OlsFit::fit(x.view(), y.view()).expect("well-posed regression");

        // Assert
        assert_relative_eq!(fit.beta[0], 0.5, epsilon = 1e-9);
        assert_relative_eq!(fit.beta[1], 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.beta[2], -1.0, epsilon = 1e-9);
        assert!(fit.ssr < 1e-18);
        assert_eq!(fit.df_resid(), 2);
    }

    #[test]
    // Purpose
    // -------
    // Collinear and zero columns are reported as a singular design.
    fn ols_fit_rejects_singular_design() {
        // Arrange
        let collinear = array![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0], [1.0, 2.0]];
        let zero_col = array![[1.0, 0.0], [1.0, 0.0], [1.0, 0.0]];
        let y4 = array![1.0, 2.0, 3.0, 4.0];
        let y3 = array![1.0, 2.0, 3.0];

        // Act / Assert
        assert_eq!(OlsFit::fit(collinear.view(), y4.view()), Err(InferenceError::SingularDesign));
        assert_eq!(OlsFit::fit(zero_col.view(), y3.view()), Err(InferenceError::SingularDesign));
    }

    #[test]
    // Purpose
    // -------
    // Too few observations or mismatched shapes are rejected up front.
    fn ols_fit_rejects_bad_shapes() {
        // Arrange
        let x = array![[1.0, 0.0], [1.0, 1.0]];
        let y = array![1.0, 2.0];
        let y_short = array![1.0];

        // Act / Assert
        assert!(matches!(
            OlsFit::fit(x.view(), y.view()),
            Err(InferenceError::InsufficientObservations { observations: 2, regressors: 2 })
        ));
        assert!(matches!(
            OlsFit::fit(x.view(), y_short.view()),
            Err(InferenceError::ShapeMismatch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Both covariance flavors are symmetric k×k matrices with positive
    // diagonals on a noisy regression.
    fn ols_covariances_are_symmetric_with_positive_diagonal() {
        // Arrange
        let x = array![
            [1.0, 0.3],
            [1.0, -1.2],
            [1.0, 0.8],
            [1.0, 2.1],
            [1.0, -0.4],
            [1.0, 1.5],
            [1.0, -2.0]
        ];
        let y = array![0.2, -0.9, 1.1, 1.7, 0.1, 0.9, -1.6];
        let fit = OlsFit::fit(x.view(), y.view()).expect("well-posed regression");
        let hac = HACOptions::new(Some(0), KernelType::IID, false, true);

        // Act
        let classical = fit.classical_covariance();
        let robust = fit.robust_covariance(&hac);

        // Assert
        for cov in [&classical, &robust] {
            assert_eq!(cov.shape(), &[2, 2]);
            assert!(cov[[0, 0]] > 0.0 && cov[[1, 1]] > 0.0);
            assert_relative_eq!(cov[[0, 1]], cov[[1, 0]], epsilon = 1e-12);
        }
    }
}
