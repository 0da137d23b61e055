//! network::adjacency — adjacency validation and the Granger network builder.
//!
//! Purpose
//! -------
//! Turn a `T×N` return window into a binary directed adjacency matrix by
//! running one Granger-causality test per ordered entity pair and
//! thresholding the p-values, and provide the shared shape checks used by
//! every graph metric.
//!
//! Key behaviors
//! -------------
//! - [`CausalAdjacencyBuilder::p_values`] runs the `N(N−1)` pairwise tests
//!   in parallel with rayon and assembles them into an `N×N` matrix.
//! - [`CausalAdjacencyBuilder::build`] sets `adj[i, j] = 1` when
//!   `p(i → j) < α` and forces the diagonal to zero.
//! - [`validate_adjacency`] checks that a matrix is non-empty, square and
//!   finite before any metric reads it.
//!
//! Conventions
//! -----------
//! - Row = cause (source), column = effect (target). In-degree is therefore
//!   a column sum and out-degree a row sum.
//! - Any pairwise test failure aborts the whole build with
//!   [`NetworkError::Causality`] naming the pair. Degenerate pairs
//!   (constant or duplicated columns) are not failures: the Granger test
//!   reports `p = 1` for them, so they never carry an edge.
//!
//! Testing notes
//! -------------
//! - Unit tests use a planted lead-lag pair and check orientation, the zero
//!   diagonal, and error reporting for bad windows.

use crate::{
    network::errors::{NetworkError, NetworkResult},
    statistical_tests::granger::{GrangerOptions, GrangerOutcome},
};
use ndarray::{Array2, ArrayView2};
use rayon::prelude::*;

/// Check that `adj` is a non-empty, square, finite matrix; returns `N`.
pub fn validate_adjacency(adj: ArrayView2<f64>) -> NetworkResult<usize> {
    let (rows, cols) = adj.dim();
    if rows == 0 || cols == 0 {
        return Err(NetworkError::EmptyMatrix);
    }
    if rows != cols {
        return Err(NetworkError::NotSquare { rows, cols });
    }
    if let Some(((row, col), _)) = adj.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(NetworkError::NonFiniteEntry { row, col });
    }
    Ok(rows)
}

/// Exact symmetry test `adj == adjᵀ`.
pub fn is_symmetric(adj: ArrayView2<f64>) -> bool {
    adj.nrows() == adj.ncols() && adj.indexed_iter().all(|((i, j), &v)| v == adj[[j, i]])
}

/// CausalAdjacencyBuilder — pairwise Granger network for one window.
///
/// Fields
/// ------
/// - `significance`: level `α`; an edge is drawn when `p < α`.
/// - `options`: classical or robust variance for the pairwise tests.
#[derive(Debug, Clone, PartialEq)]
pub struct CausalAdjacencyBuilder {
    significance: f64,
    options: GrangerOptions,
}

impl CausalAdjacencyBuilder {
    /// Errors
    /// ------
    /// - `NetworkError::InvalidSignificance` unless `0 < significance < 1`.
    pub fn new(significance: f64, options: GrangerOptions) -> NetworkResult<Self> {
        if !(significance > 0.0 && significance < 1.0) {
            return Err(NetworkError::InvalidSignificance { significance });
        }
        Ok(CausalAdjacencyBuilder { significance, options })
    }

    pub fn significance(&self) -> f64 {
        self.significance
    }

    pub fn options(&self) -> &GrangerOptions {
        &self.options
    }

    /// Pairwise p-values; entry `(i, j)` is `p(i → j)`, diagonal is 1.
    ///
    /// Parameters
    /// ----------
    /// - `window`: `ArrayView2<f64>`
    ///   `T×N` returns, rows = time.
    ///
    /// Errors
    /// ------
    /// - `NetworkError::EmptyMatrix` when the window has no columns.
    /// - `NetworkError::Causality` for the first failing pair in row-major
    ///   order.
    pub fn p_values(&self, window: ArrayView2<f64>) -> NetworkResult<Array2<f64>> {
        let n = window.ncols();
        if n == 0 {
            return Err(NetworkError::EmptyMatrix);
        }
        let pairs: Vec<(usize, usize)> =
            (0..n).flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j))).collect();

        let outcomes: Vec<((usize, usize), Result<f64, NetworkError>)> = pairs
            .into_par_iter()
            .map(|(cause, effect)| {
                let outcome =
                    GrangerOutcome::granger_causality(window.column(cause), window.column(effect), &self.options)
                        .map(|o| o.p_value())
                        .map_err(|source| NetworkError::Causality { cause, effect, source });
                ((cause, effect), outcome)
            })
            .collect();

        let mut p = Array2::<f64>::ones((n, n));
        for ((cause, effect), outcome) in outcomes {
            p[[cause, effect]] = outcome?;
        }
        Ok(p)
    }

    /// Binary adjacency with `adj[i, j] = 1` iff `p(i → j) < α`, zero diagonal.
    pub fn build(&self, window: ArrayView2<f64>) -> NetworkResult<Array2<f64>> {
        let p = self.p_values(window)?;
        let mut adj = p.mapv(|v| if v < self.significance { 1.0 } else { 0.0 });
        adj.diag_mut().fill(0.0);
        Ok(adj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistical_tests::errors::GrangerError;
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    fn planted_window(t: usize) -> Array2<f64> {
        // Column 0 drives column 1 with one lag; column 2 is independent.
        let mut rng = StdRng::seed_from_u64(17);
        let normal = Normal::new(0.0, 1.0).expect("valid normal");
        let mut w = Array2::<f64>::zeros((t, 3));
        for row in 0..t {
            w[[row, 0]] = normal.sample(&mut rng);
            w[[row, 2]] = normal.sample(&mut rng);
            let lead = if row > 0 { w[[row - 1, 0]] } else { 0.0 };
            w[[row, 1]] = 0.9 * lead + 0.3 * normal.sample(&mut rng);
        }
        w
    }

    #[test]
    // Purpose
    // -------
    // The builder finds the planted edge in the row = cause orientation and
    // keeps a zero diagonal.
    //
    // Given
    // -----
    // - x₀ → x₁ with lag one, x₂ independent, T = 250, α = 0.01.
    //
    // Expect
    // ------
    // - adj[0, 1] = 1, adj[1, 0] = 0, diagonal zero, entries binary.
    fn build_detects_planted_edge_with_row_as_cause() {
        // Arrange
        let window = planted_window(250);
        let builder = CausalAdjacencyBuilder::new(0.01, GrangerOptions::default()).expect("valid α");

        // Act
        let adj = builder.build(window.view()).expect("adjacency");

        // Assert
        assert_eq!(adj.dim(), (3, 3));
        assert_eq!(adj[[0, 1]], 1.0);
        assert_eq!(adj[[1, 0]], 0.0);
        assert!(adj.diag().iter().all(|&v| v == 0.0));
        assert!(adj.iter().all(|&v| v == 0.0 || v == 1.0));
    }

    #[test]
    // Purpose
    // -------
    // Bad significance levels and too-short windows are rejected.
    fn builder_rejects_invalid_inputs() {
        // Arrange
        let short = planted_window(4);

        // Act
        let bad_alpha = CausalAdjacencyBuilder::new(0.0, GrangerOptions::default());
        let builder = CausalAdjacencyBuilder::new(0.05, GrangerOptions::default()).expect("valid α");
        let err = builder.build(short.view());

        // Assert
        assert_eq!(bad_alpha, Err(NetworkError::InvalidSignificance { significance: 0.0 }));
        assert_eq!(
            err,
            Err(NetworkError::Causality {
                cause: 0,
                effect: 1,
                source: GrangerError::InsufficientData { len: 4, required: 5 },
            })
        );
    }

    #[test]
    // Purpose
    // -------
    // Duplicated entity columns build a network instead of failing, with no
    // edge between the duplicates.
    //
    // Given
    // -----
    // - The planted window with column 2 replaced by a copy of column 0.
    //
    // Expect
    // ------
    // - `p(0 → 2) = p(2 → 0) = 1`, so both entries are 0 at α = 0.05.
    fn build_tolerates_duplicated_columns() {
        // Arrange
        let mut window = planted_window(120);
        let lead = window.column(0).to_owned();
        window.column_mut(2).assign(&lead);
        let builder = CausalAdjacencyBuilder::new(0.05, GrangerOptions::default()).expect("valid α");

        // Act
        let p = builder.p_values(window.view()).expect("p-values");
        let adj = builder.build(window.view()).expect("adjacency");

        // Assert
        assert_eq!(p[[0, 2]], 1.0);
        assert_eq!(p[[2, 0]], 1.0);
        assert_eq!(adj[[0, 2]], 0.0);
        assert_eq!(adj[[2, 0]], 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Shape checks and the symmetry helper behave on small matrices.
    fn validate_adjacency_and_symmetry() {
        let sym = array![[0.0, 1.0], [1.0, 0.0]];
        let asym = array![[0.0, 1.0], [0.0, 0.0]];
        let rect = Array2::<f64>::zeros((2, 3));
        let nan = array![[0.0, f64::NAN], [1.0, 0.0]];

        assert_eq!(validate_adjacency(sym.view()), Ok(2));
        assert_eq!(validate_adjacency(rect.view()), Err(NetworkError::NotSquare { rows: 2, cols: 3 }));
        assert_eq!(validate_adjacency(nan.view()), Err(NetworkError::NonFiniteEntry { row: 0, col: 1 }));
        assert_eq!(validate_adjacency(Array2::<f64>::zeros((0, 0)).view()), Err(NetworkError::EmptyMatrix));
        assert!(is_symmetric(sym.view()));
        assert!(!is_symmetric(asym.view()));
    }
}
