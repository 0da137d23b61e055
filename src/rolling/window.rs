//! rolling::window — window slicing and the per-window computation.
//!
//! Purpose
//! -------
//! Define how the return matrix is cut into rolling windows and what a
//! single window task computes: normalization, the Granger network, its
//! indicators and centralities, the variance decomposition, and a PCA.
//!
//! Key behaviors
//! -------------
//! - Window `w` covers rows `w..w + bandwidth` of the return matrix; there
//!   are `T − bandwidth + 1` windows.
//! - Columns are z-scored; zero-variance columns are zero-filled, which the
//!   Granger test reads as "no causality" and the VAR fit jitters.
//! - [`WindowTask::run`] is a pure function of its inputs and returns one
//!   immutable [`WindowResult`].

use crate::{
    errors::ConnectednessResult,
    network::{
        adjacency::CausalAdjacencyBuilder,
        centrality::Centralities,
        indicators::{GroupPartition, Indicators},
    },
    numerical_stability::standardize_columns,
    pca::PcaOutcome,
    var::fevd::{VarianceDecomposer, VarianceDecomposition},
};
use ndarray::{Array2, ArrayView2, s};

/// Number of rolling windows of length `bandwidth` over `observations` rows.
pub fn window_count(observations: usize, bandwidth: usize) -> usize {
    if bandwidth == 0 || bandwidth > observations { 0 } else { observations - bandwidth + 1 }
}

/// Read-only view of window `index`.
///
/// Panics
/// ------
/// - If `index + bandwidth > returns.nrows()`; callers iterate over
///   `0..window_count(..)`.
pub fn window_view<'a>(returns: ArrayView2<'a, f64>, index: usize, bandwidth: usize) -> ArrayView2<'a, f64> {
    returns.slice_move(s![index..index + bandwidth, ..])
}

/// WindowResult — everything computed for one window.
///
/// Fields
/// ------
/// - `index`: 0-based window index.
/// - `adjacency`: binary Granger network, row = cause, zero diagonal.
/// - `indicators`: DCI and connection counts of `adjacency`.
/// - `centralities`: all centrality measures of `adjacency`.
/// - `fevd`: variance decomposition of the normalized window.
/// - `pca`: PCA of the normalized window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowResult {
    pub index: usize,
    pub adjacency: Array2<f64>,
    pub indicators: Indicators,
    pub centralities: Centralities,
    pub fevd: VarianceDecomposition,
    pub pca: PcaOutcome,
}

/// WindowTask — shared, immutable configuration of every window task.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowTask {
    builder: CausalAdjacencyBuilder,
    decomposer: VarianceDecomposer,
    partition: Option<GroupPartition>,
}

impl WindowTask {
    pub fn new(
        builder: CausalAdjacencyBuilder, decomposer: VarianceDecomposer, partition: Option<GroupPartition>,
    ) -> Self {
        WindowTask { builder, decomposer, partition }
    }

    /// Run the full per-window pipeline on `window` (rows = time).
    ///
    /// Errors
    /// ------
    /// - Granger, network, VAR or PCA failures, converted into
    ///   `ConnectednessError`; the caller attaches the window index.
    pub fn run(&self, index: usize, window: ArrayView2<f64>) -> ConnectednessResult<WindowResult> {
        let normalized = standardize_columns(&window);
        let adjacency = self.builder.build(normalized.view())?;
        let indicators = Indicators::compute(adjacency.view(), self.partition.as_ref())?;
        let centralities = Centralities::compute(adjacency.view())?;
        let fevd = self.decomposer.decompose(normalized.view())?;
        let pca = PcaOutcome::compute(normalized.view())?;
        Ok(WindowResult { index, adjacency, indicators, centralities, fevd, pca })
    }
}
