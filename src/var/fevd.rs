//! var::fevd — forecast error variance decomposition and spillover tables.
//!
//! Purpose
//! -------
//! Turn a fitted VAR into the share of each entity's `h`-step forecast-error
//! variance attributable to shocks originating at every entity, in either
//! the generalized (Pesaran–Shin) or the orthogonal (Cholesky) identification.
//!
//! Key behaviors
//! -------------
//! - Impulse matrix `B` (column `i` = response of all entities to a shock
//!   at `i`):
//!   - generalized: `B[:, i] = Σ eᵢ / √σᵢᵢ`;
//!   - orthogonal: `B = P`, the lower Cholesky factor of `Σ`.
//! - Step-`j` responses `Rⱼ = Ψⱼ B`; squared responses are accumulated over
//!   steps and normalized per row, producing one `N×N` matrix per step.
//! - [`VarianceDecomposition::spillover_network`] reorients the final-step
//!   table into a weighted directed network (row = shock source) with a
//!   zero diagonal, alongside total / to-others / from-others summaries.
//!
//! Invariants & assumptions
//! ------------------------
//! - Row = receiving entity, column = shock source; every row of every step
//!   sums to 1 for both identifications.
//! - Zero-variance input columns are perturbed by seeded jitter before the
//!   fit (see [`jitter_degenerate_columns`]), keeping column order intact.
//!
//! Downstream usage
//! ----------------
//! - [`VarianceDecomposer::decompose`] is the standalone entry point used by
//!   the Python `fevd` binding; it runs independently of the rolling
//!   orchestrator.

use crate::{
    numerical_stability::jitter_degenerate_columns,
    var::{
        errors::{VarError, VarResult},
        model::VarModel,
    },
};
use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Largest accepted VAR lag order.
pub const MAX_LAGS: usize = 5;
/// Largest accepted FEVD horizon.
pub const MAX_HORIZON: usize = 15;

/// FevdOptions — lag order, horizon and identification scheme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FevdOptions {
    lags: usize,
    horizon: usize,
    generalized: bool,
}

impl FevdOptions {
    /// Validate and build FEVD settings.
    ///
    /// Errors
    /// ------
    /// - `VarError::InvalidLagOrder` unless `1 ≤ lags ≤ 5`.
    /// - `VarError::InvalidHorizon` unless `1 ≤ horizon ≤ 15`.
    pub fn new(lags: usize, horizon: usize, generalized: bool) -> VarResult<Self> {
        if !(1..=MAX_LAGS).contains(&lags) {
            return Err(VarError::InvalidLagOrder { lags });
        }
        if !(1..=MAX_HORIZON).contains(&horizon) {
            return Err(VarError::InvalidHorizon { horizon });
        }
        Ok(FevdOptions { lags, horizon, generalized })
    }

    pub fn lags(&self) -> usize {
        self.lags
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn generalized(&self) -> bool {
        self.generalized
    }
}

impl Default for FevdOptions {
    fn default() -> Self {
        FevdOptions { lags: 2, horizon: 4, generalized: true }
    }
}

/// VarianceDecomposer — fits a VAR to a window and decomposes its
/// forecast-error variance.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VarianceDecomposer {
    options: FevdOptions,
}

impl VarianceDecomposer {
    pub fn new(options: FevdOptions) -> Self {
        VarianceDecomposer { options }
    }

    pub fn options(&self) -> &FevdOptions {
        &self.options
    }

    /// Fit a VAR(p) to `window` and return its variance decomposition.
    ///
    /// Parameters
    /// ----------
    /// - `window`: `ArrayView2<f64>`
    ///   `T×N` returns (rows = time). Zero-variance columns are jittered.
    ///
    /// Returns
    /// -------
    /// `VarResult<VarianceDecomposition>` with `horizon` step matrices.
    ///
    /// Errors
    /// ------
    /// - Any [`VarModel::fit`] error (too few rows for the lag order,
    ///   non-finite values, singular design, non-PD `Σ`).
    pub fn decompose(&self, window: ArrayView2<f64>) -> VarResult<VarianceDecomposition> {
        // Position must be reported before jitter arithmetic spreads NaNs.
        if let Some(((row, col), _)) = window.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(VarError::NonFiniteData { row, col });
        }
        let (prepared, _) = jitter_degenerate_columns(&window);
        let model = VarModel::fit(prepared.view(), self.options.lags)?;
        self.decompose_model(&model)
    }

    /// Decompose an already-fitted model at the configured horizon.
    pub fn decompose_model(&self, model: &VarModel) -> VarResult<VarianceDecomposition> {
        let impulse = if self.options.generalized {
            generalized_impulse(&model.sigma)?
        } else {
            model.sigma_cholesky()?
        };
        let ma = model.ma_coefficients(self.options.horizon);

        let n = model.n_entities();
        let mut cumulative = Array2::<f64>::zeros((n, n));
        let mut steps = Vec::with_capacity(ma.len());
        for psi in &ma {
            let response = psi.dot(&impulse);
            cumulative += &response.mapv(|r| r * r);
            steps.push(normalize_rows(&cumulative)?);
        }
        Ok(VarianceDecomposition { steps })
    }
}

/// VarianceDecomposition — FEVD tables for steps `1..=h`.
///
/// `steps()[k]` is the decomposition at horizon `k + 1`; row `i`, column
/// `j` is the share of entity `i`'s forecast-error variance due to shocks
/// at entity `j`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VarianceDecomposition {
    steps: Vec<Array2<f64>>,
}

impl VarianceDecomposition {
    pub fn horizon(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[Array2<f64>] {
        &self.steps
    }

    /// Table at horizon `h` (1-based); `None` outside `1..=horizon()`.
    pub fn at_horizon(&self, h: usize) -> Option<&Array2<f64>> {
        h.checked_sub(1).and_then(|k| self.steps.get(k))
    }

    /// Table at the final horizon.
    pub fn matrix(&self) -> Option<&Array2<f64>> {
        self.steps.last()
    }

    /// Weighted directed network from the final-horizon table.
    ///
    /// Entry `(i, j)` is the share of entity `j`'s variance caused by shocks
    /// at `i` (row = source, column = target), with a zero diagonal, so the
    /// orientation matches the causal adjacency matrices.
    pub fn spillover_network(&self) -> Array2<f64> {
        let Some(last) = self.matrix() else {
            return Array2::zeros((0, 0));
        };
        let mut net = last.t().to_owned();
        net.diag_mut().fill(0.0);
        net
    }

    /// Average share of forecast-error variance coming from other entities,
    /// in `[0, 1]`.
    pub fn total_spillover(&self) -> f64 {
        let net = self.spillover_network();
        let n = net.nrows();
        if n == 0 { 0.0 } else { net.sum() / n as f64 }
    }

    /// Directional spillover transmitted by each entity to all others.
    pub fn spillover_to_others(&self) -> Array1<f64> {
        self.spillover_network().sum_axis(Axis(1))
    }

    /// Directional spillover received by each entity from all others.
    pub fn spillover_from_others(&self) -> Array1<f64> {
        self.spillover_network().sum_axis(Axis(0))
    }
}

fn generalized_impulse(sigma: &Array2<f64>) -> VarResult<Array2<f64>> {
    let mut impulse = sigma.clone();
    for (i, mut col) in impulse.columns_mut().into_iter().enumerate() {
        let s = sigma[[i, i]];
        if !(s.is_finite() && s > 0.0) {
            return Err(VarError::NonPositiveDefiniteCovariance);
        }
        col /= s.sqrt();
    }
    Ok(impulse)
}

fn normalize_rows(cumulative: &Array2<f64>) -> VarResult<Array2<f64>> {
    let mut out = cumulative.clone();
    for mut row in out.rows_mut() {
        let total = row.sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(VarError::NonPositiveDefiniteCovariance);
        }
        row /= total;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Option validation.
    // - Closed-form generalized FEVD for a 2-entity VAR(1).
    // - Orthogonal FEVD of a decoupled system (identity).
    // - Row sums at every step on an estimated model.
    // - Spillover orientation and summaries.
    // -------------------------------------------------------------------------

    fn model(a: Array2<f64>, sigma: Array2<f64>) -> VarModel {
        VarModel::from_parts(Array1::zeros(a.nrows()), vec![a], sigma).expect("valid parts")
    }

    #[test]
    // Purpose
    // -------
    // Out-of-range lags and horizons are rejected.
    fn fevd_options_validate_ranges() {
        assert_eq!(FevdOptions::new(0, 4, true), Err(VarError::InvalidLagOrder { lags: 0 }));
        assert_eq!(FevdOptions::new(6, 4, true), Err(VarError::InvalidLagOrder { lags: 6 }));
        assert_eq!(FevdOptions::new(2, 0, true), Err(VarError::InvalidHorizon { horizon: 0 }));
        assert_eq!(FevdOptions::new(2, 16, false), Err(VarError::InvalidHorizon { horizon: 16 }));
        assert!(FevdOptions::new(5, 15, false).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Generalized FEVD matches hand-derived values.
    //
    // Given
    // -----
    // - Σ = [[1, ρ], [ρ, 1]] with ρ = 0.5 at h = 1 (only Ψ₀ = I enters).
    // - A = [[0.5, 0], [0.2, 0.3]], Σ = I at h = 2.
    //
    // Expect
    // ------
    // - h = 1: row 0 = [1, ρ²] / (1 + ρ²).
    // - h = 2: row 0 = [1, 0]; row 1 = [0.04, 1.09] / 1.13.
    fn generalized_fevd_matches_closed_form() {
        // Arrange
        let rho: f64 = 0.5;
        let correlated = model(array![[0.3, 0.0], [0.0, 0.3]], array![[1.0, rho], [rho, 1.0]]);
        let lower_triangular = model(array![[0.5, 0.0], [0.2, 0.3]], Array2::eye(2));
        let h1 = VarianceDecomposer::new(FevdOptions::new(1, 1, true).expect("valid"));
        let h2 = VarianceDecomposer::new(FevdOptions::new(1, 2, true).expect("valid"));

        // Act
        let d1 = h1.decompose_model(&correlated).expect("h=1 fevd");
        let d2 = h2.decompose_model(&lower_triangular).expect("h=2 fevd");

        // Assert
        let m1 = d1.matrix().expect("one step");
        assert_relative_eq!(m1[[0, 0]], 1.0 / (1.0 + rho * rho), epsilon = 1e-12);
        assert_relative_eq!(m1[[0, 1]], rho * rho / (1.0 + rho * rho), epsilon = 1e-12);
        assert_relative_eq!(m1[[1, 0]], rho * rho / (1.0 + rho * rho), epsilon = 1e-12);

        let m2 = d2.at_horizon(2).expect("two steps");
        assert_relative_eq!(m2[[0, 0]], 1.0, epsilon = 1e-12);
        assert_relative_eq!(m2[[0, 1]], 0.0, epsilon = 1e-12);
        assert_relative_eq!(m2[[1, 0]], 0.04 / 1.13, epsilon = 1e-12);
        assert_relative_eq!(m2[[1, 1]], 1.09 / 1.13, epsilon = 1e-12);
        assert_eq!(d2.at_horizon(1), Some(&Array2::<f64>::eye(2)));
        assert_eq!(d2.at_horizon(3), None);
    }

    #[test]
    // Purpose
    // -------
    // With diagonal dynamics and diagonal Σ, each entity explains all of
    // its own variance under the orthogonal scheme.
    fn orthogonal_fevd_of_decoupled_system_is_identity() {
        // Arrange
        let decoupled = model(array![[0.6, 0.0], [0.0, -0.4]], array![[2.0, 0.0], [0.0, 0.5]]);
        let decomposer = VarianceDecomposer::new(FevdOptions::new(1, 5, false).expect("valid"));

        // Act
        let d = decomposer.decompose_model(&decoupled).expect("fevd");

        // Assert
        assert_eq!(d.horizon(), 5);
        for step in d.steps() {
            for ((i, j), &v) in step.indexed_iter() {
                assert_relative_eq!(v, if i == j { 1.0 } else { 0.0 }, epsilon = 1e-12);
            }
        }
        assert_relative_eq!(d.total_spillover(), 0.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Rows sum to one at every step for both schemes on an estimated VAR(2),
    // including a window with a constant column.
    fn decompose_rows_sum_to_one_on_estimated_model() {
        // Arrange
        let mut rng = StdRng::seed_from_u64(9);
        let normal = Normal::new(0.0, 0.01).expect("valid normal");
        let mut data = Array2::<f64>::zeros((200, 3));
        for t in 1..200 {
            let e: Vec<f64> = (0..3).map(|_| normal.sample(&mut rng)).collect();
            data[[t, 0]] = 0.3 * data[[t - 1, 0]] + e[0];
            data[[t, 1]] = 0.4 * data[[t - 1, 0]] + e[1];
        }
        data.column_mut(2).fill(0.0);

        for generalized in [true, false] {
            let decomposer = VarianceDecomposer::new(FevdOptions::new(2, 6, generalized).expect("valid"));

            // Act
            let d = decomposer.decompose(data.view()).expect("fevd with jittered column");

            // Assert
            assert_eq!(d.horizon(), 6);
            for step in d.steps() {
                for row in step.rows() {
                    assert_relative_eq!(row.sum(), 1.0, epsilon = 1e-10);
                    assert!(row.iter().all(|&v| (0.0..=1.0 + 1e-12).contains(&v)));
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // The spillover network is the transposed final table with a zero
    // diagonal, and the summaries are consistent with it.
    fn spillover_network_orientation_and_summaries() {
        // Arrange
        let d = VarianceDecomposition { steps: vec![array![[0.7, 0.3], [0.1, 0.9]]] };

        // Act
        let net = d.spillover_network();

        // Assert
        assert_eq!(net, array![[0.0, 0.1], [0.3, 0.0]]);
        assert_eq!(d.spillover_to_others(), array![0.1, 0.3]);
        assert_eq!(d.spillover_from_others(), array![0.3, 0.1]);
        assert_relative_eq!(d.total_spillover(), 0.2, epsilon = 1e-12);
    }
}
