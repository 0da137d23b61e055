//! var::model — VAR(p) estimation, companion form and MA coefficients.
//!
//! Purpose
//! -------
//! Fit the reduced-form vector autoregression
//!
//! ```text
//! yₜ = c + A₁ yₜ₋₁ + … + A_p yₜ₋ₚ + uₜ,   E[uₜ uₜᵀ] = Σ
//! ```
//!
//! to a `T×N` window and expose what the variance decomposition needs: the
//! lag matrices `A₁..A_p`, the residual covariance `Σ`, the companion matrix
//! and the moving-average (impulse-response) coefficients `Ψ₀..Ψ_{h−1}`.
//!
//! Key behaviors
//! -------------
//! - Equation-by-equation OLS with an intercept through
//!   [`OlsFit`](crate::inference::OlsFit); every equation shares the same
//!   design `[1, yₜ₋₁ᵀ, …, yₜ₋ₚᵀ]`.
//! - `Σ = ÊᵀÊ / (T − p)` (maximum-likelihood scaling), checked for positive
//!   definiteness with a Cholesky factorization.
//! - Companion matrix `C` (`Np×Np`): first block row `[A₁ … A_p]`, an
//!   `(p−1)N` identity below it shifting the lag stack, zeros elsewhere.
//! - `Ψᵢ` is the top-left `N×N` block of `Cⁱ` (so `Ψ₀ = I`, `Ψ₁ = A₁`).
//!
//! Invariants & assumptions
//! ------------------------
//! - `A_k[r, c]` is the effect of entity `c` at lag `k` on equation `r`.
//! - The effective sample `T − p` must exceed the regressor count `Np + 1`.
//!
//! Testing notes
//! -------------
//! - Unit tests check parameter recovery on a simulated VAR(1), the MA
//!   recursion against hand-expanded products for p = 2 and p = 3, the
//!   companion layout, and each rejection path.

use crate::{
    inference::ols::OlsFit,
    var::errors::{VarError, VarResult},
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2, ArrayView2, s};

/// VarModel — estimated (or supplied) VAR(p) parameters.
///
/// Fields
/// ------
/// - `intercept`: `Array1<f64>`, length `N`.
/// - `coefficients`: `Vec<Array2<f64>>`, `[A₁, …, A_p]`, each `N×N`.
/// - `sigma`: `Array2<f64>`, residual covariance `Σ`, `N×N`.
/// - `nobs`: effective number of observations used (`T − p`); 0 for models
///   built with [`VarModel::from_parts`].
#[derive(Debug, Clone, PartialEq)]
pub struct VarModel {
    pub intercept: Array1<f64>,
    pub coefficients: Vec<Array2<f64>>,
    pub sigma: Array2<f64>,
    pub nobs: usize,
}

impl VarModel {
    /// Fit a VAR(`lags`) with intercept to `data` (rows = time).
    ///
    /// Parameters
    /// ----------
    /// - `data`: `ArrayView2<f64>`
    ///   `T×N` window of finite observations.
    /// - `lags`: `usize`
    ///   Lag order `p ≥ 1`.
    ///
    /// Returns
    /// -------
    /// `VarResult<VarModel>`
    ///
    /// Errors
    /// ------
    /// - `VarError::InvalidLagOrder` when `lags == 0`.
    /// - `VarError::EmptyData` for a window without rows or columns.
    /// - `VarError::NonFiniteData` at the first non-finite cell.
    /// - `VarError::InsufficientObservations` when `T − p ≤ Np + 1`.
    /// - `VarError::SingularDesign` when lagged regressors are collinear
    ///   (e.g. a constant column).
    /// - `VarError::NonPositiveDefiniteCovariance` when `Σ` has no Cholesky
    ///   factor.
    pub fn fit(data: ArrayView2<f64>, lags: usize) -> VarResult<Self> {
        if lags == 0 {
            return Err(VarError::InvalidLagOrder { lags });
        }
        let (t, n) = data.dim();
        if t == 0 || n == 0 {
            return Err(VarError::EmptyData);
        }
        if let Some(((row, col), _)) = data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(VarError::NonFiniteData { row, col });
        }
        let regressors = n * lags + 1;
        let observations = t.saturating_sub(lags);
        if observations <= regressors {
            return Err(VarError::InsufficientObservations { observations, required: regressors });
        }

        let design = lagged_design(data, lags);
        let mut intercept = Array1::<f64>::zeros(n);
        let mut coefficients = vec![Array2::<f64>::zeros((n, n)); lags];
        let mut residuals = Array2::<f64>::zeros((observations, n));

        for eq in 0..n {
            let response = data.slice(s![lags.., eq]);
            let fit = OlsFit::fit(design.view(), response)?;
            intercept[eq] = fit.beta[0];
            for (k, a_k) in coefficients.iter_mut().enumerate() {
                let start = 1 + k * n;
                a_k.row_mut(eq).assign(&fit.beta.slice(s![start..start + n]));
            }
            residuals.column_mut(eq).assign(&fit.residuals);
        }

        let sigma = residuals.t().dot(&residuals) / observations as f64;
        lower_cholesky(&sigma)?;

        Ok(VarModel { intercept, coefficients, sigma, nobs: observations })
    }

    /// Build a model from known parameters.
    ///
    /// Errors
    /// ------
    /// - `VarError::InvalidLagOrder` for an empty coefficient list.
    /// - `VarError::ShapeMismatch` if any matrix is not `N×N` with
    ///   `N = intercept.len()`.
    /// - `VarError::NonPositiveDefiniteCovariance` if `sigma` is not PD.
    pub fn from_parts(
        intercept: Array1<f64>, coefficients: Vec<Array2<f64>>, sigma: Array2<f64>,
    ) -> VarResult<Self> {
        if coefficients.is_empty() {
            return Err(VarError::InvalidLagOrder { lags: 0 });
        }
        let n = intercept.len();
        if n == 0 {
            return Err(VarError::EmptyData);
        }
        for mat in coefficients.iter().chain(std::iter::once(&sigma)) {
            if mat.dim() != (n, n) {
                return Err(VarError::ShapeMismatch { expected: (n, n), found: mat.dim() });
            }
        }
        lower_cholesky(&sigma)?;
        Ok(VarModel { intercept, coefficients, sigma, nobs: 0 })
    }

    pub fn n_entities(&self) -> usize {
        self.intercept.len()
    }

    pub fn lags(&self) -> usize {
        self.coefficients.len()
    }

    /// Companion matrix of the VAR in first-order form (`Np×Np`).
    pub fn companion(&self) -> Array2<f64> {
        let n = self.n_entities();
        let p = self.lags();
        let mut companion = Array2::<f64>::zeros((n * p, n * p));
        for (k, a_k) in self.coefficients.iter().enumerate() {
            companion.slice_mut(s![..n, k * n..(k + 1) * n]).assign(a_k);
        }
        for i in 0..(p - 1) * n {
            companion[[n + i, i]] = 1.0;
        }
        companion
    }

    /// Moving-average coefficients `[Ψ₀, …, Ψ_{horizon−1}]`.
    ///
    /// `Ψᵢ` is the top-left `N×N` block of `Cⁱ`. The returned vector always
    /// has exactly `horizon` entries.
    pub fn ma_coefficients(&self, horizon: usize) -> Vec<Array2<f64>> {
        let n = self.n_entities();
        let companion = self.companion();
        let mut power = Array2::<f64>::eye(companion.nrows());
        let mut out = Vec::with_capacity(horizon);
        for step in 0..horizon {
            if step > 0 {
                power = power.dot(&companion);
            }
            out.push(power.slice(s![..n, ..n]).to_owned());
        }
        out
    }

    /// Lower Cholesky factor `P` of `Σ` (`Σ = P Pᵀ`).
    pub fn sigma_cholesky(&self) -> VarResult<Array2<f64>> {
        lower_cholesky(&self.sigma)
    }
}

/// Design matrix `[1, yₜ₋₁ᵀ, …, yₜ₋ₚᵀ]` for `t = p..T−1`.
fn lagged_design(data: ArrayView2<f64>, lags: usize) -> Array2<f64> {
    let (t, n) = data.dim();
    let mut design = Array2::<f64>::ones((t - lags, 1 + n * lags));
    for k in 1..=lags {
        let start = 1 + (k - 1) * n;
        design
            .slice_mut(s![.., start..start + n])
            .assign(&data.slice(s![lags - k..t - k, ..]));
    }
    design
}

pub(crate) fn lower_cholesky(sigma: &Array2<f64>) -> VarResult<Array2<f64>> {
    let n = sigma.nrows();
    if sigma.iter().any(|v| !v.is_finite()) {
        return Err(VarError::NonPositiveDefiniteCovariance);
    }
    let mat = DMatrix::<f64>::from_fn(n, n, |i, j| sigma[[i, j]]);
    let chol = mat.cholesky().ok_or(VarError::NonPositiveDefiniteCovariance)?;
    let l = chol.l();
    Ok(Array2::from_shape_fn((n, n), |(i, j)| l[(i, j)]))
}
