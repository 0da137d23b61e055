//! rolling::aggregate — merge window results into the final dataset.
//!
//! Purpose
//! -------
//! Place every [`WindowResult`] on the original time axis, build the
//! averaged network across windows and recompute its centralities, and run
//! the whole-sample PCA.
//!
//! Key behaviors
//! -------------
//! - Window `w` is written at time index `w + bandwidth − 1`; the first
//!   `bandwidth − 1` entries of every series are explicitly missing.
//! - Averaged network: elementwise mean of all window adjacencies,
//!   binarized with `entry ≥ mean(all entries)`. When no window has any
//!   edge the mean is zero and the averaged network is empty.
//! - Whole-sample PCA runs on the z-scored full return matrix.
//!
//! Invariants & assumptions
//! ------------------------
//! - `results` arrive ordered by window index and cover every window;
//!   placement does not depend on completion order.

use crate::{
    errors::{ConnectednessError, ConnectednessResult},
    network::{centrality::Centralities, indicators::Indicators},
    numerical_stability::standardize_columns,
    pca::PcaOutcome,
    rolling::{data::ReturnDataset, options::RollingOptions, window::WindowResult},
};
use chrono::NaiveDate;
use ndarray::{Array1, Array2};

/// TimeIndexed — a series over the full time axis with explicit gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeIndexed<T> {
    values: Vec<Option<T>>,
}

impl<T> TimeIndexed<T> {
    /// All-missing series of length `len`.
    pub fn missing(len: usize) -> Self {
        TimeIndexed { values: std::iter::repeat_with(|| None).take(len).collect() }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, t: usize) -> Option<&T> {
        self.values.get(t).and_then(Option::as_ref)
    }

    /// Store `value` at `t`; out-of-range indices are ignored.
    pub fn set(&mut self, t: usize, value: T) {
        if let Some(slot) = self.values.get_mut(t) {
            *slot = Some(value);
        }
    }

    /// Index of the first present value.
    pub fn first_index(&self) -> Option<usize> {
        self.values.iter().position(Option::is_some)
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&T>> {
        self.values.iter().map(Option::as_ref)
    }

    /// Present values in time order.
    pub fn present(&self) -> impl Iterator<Item = &T> {
        self.values.iter().flatten()
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> TimeIndexed<U> {
        TimeIndexed { values: self.values.iter().map(|v| v.as_ref().map(&f)).collect() }
    }
}

/// Named centrality measure, used to extract one series from the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CentralityMeasure {
    Betweenness,
    Closeness,
    DegreeIn,
    DegreeOut,
    DegreeTotal,
    Degree,
    Eigenvector,
    Katz,
    Clustering,
}

impl CentralityMeasure {
    pub fn select<'a>(&self, c: &'a Centralities) -> &'a Array1<f64> {
        match self {
            CentralityMeasure::Betweenness => &c.betweenness,
            CentralityMeasure::Closeness => &c.closeness,
            CentralityMeasure::DegreeIn => &c.degree_in,
            CentralityMeasure::DegreeOut => &c.degree_out,
            CentralityMeasure::DegreeTotal => &c.degree_total,
            CentralityMeasure::Degree => &c.degree_centrality,
            CentralityMeasure::Eigenvector => &c.eigenvector,
            CentralityMeasure::Katz => &c.katz,
            CentralityMeasure::Clustering => &c.clustering,
        }
    }
}

/// AggregatedDataset — final output of a rolling connectedness run.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedDataset {
    pub dates: Vec<NaiveDate>,
    pub labels: Vec<String>,
    pub entity_names: Vec<String>,
    pub group_names: Option<Vec<String>>,
    pub bandwidth: usize,
    pub causality_threshold: f64,
    pub adjacencies: Vec<Array2<f64>>,
    pub indicators: TimeIndexed<Indicators>,
    pub centralities: TimeIndexed<Centralities>,
    pub spillover: TimeIndexed<f64>,
    pub pca: TimeIndexed<PcaOutcome>,
    pub averaged_adjacency: Array2<f64>,
    pub averaged_threshold: f64,
    pub averaged_centralities: Centralities,
    pub pca_full: PcaOutcome,
}

impl AggregatedDataset {
    /// Assemble the dataset from ordered, complete window results.
    ///
    /// Errors
    /// ------
    /// - `ConnectednessError::TaskLost` if `results` is empty or a result
    ///   is out of order.
    /// - Network or PCA errors from the averaged-network summaries.
    pub fn from_windows(
        dataset: &ReturnDataset, options: &RollingOptions, results: Vec<WindowResult>,
    ) -> ConnectednessResult<Self> {
        if results.is_empty() {
            return Err(ConnectednessError::TaskLost { window: 0 });
        }
        if let Some(pos) = results.iter().enumerate().position(|(i, r)| r.index != i) {
            return Err(ConnectednessError::TaskLost { window: pos });
        }

        let t = dataset.t();
        let offset = options.bandwidth() - 1;
        let mut indicators = TimeIndexed::missing(t);
        let mut centralities = TimeIndexed::missing(t);
        let mut spillover = TimeIndexed::missing(t);
        let mut pca = TimeIndexed::missing(t);
        let mut adjacencies = Vec::with_capacity(results.len());

        for result in results {
            let at = result.index + offset;
            indicators.set(at, result.indicators);
            centralities.set(at, result.centralities);
            spillover.set(at, result.fevd.total_spillover());
            pca.set(at, result.pca);
            adjacencies.push(result.adjacency);
        }

        let (averaged_adjacency, averaged_threshold) = average_and_binarize(&adjacencies);
        let averaged_centralities = Centralities::compute(averaged_adjacency.view())?;
        let pca_full = PcaOutcome::compute(standardize_columns(&dataset.returns()).view())?;

        Ok(AggregatedDataset {
            dates: dataset.dates().to_vec(),
            labels: dataset.labels(),
            entity_names: dataset.entity_names().to_vec(),
            group_names: dataset.group_names().map(<[String]>::to_vec),
            bandwidth: options.bandwidth(),
            causality_threshold: options.causality_threshold(),
            adjacencies,
            indicators,
            centralities,
            spillover,
            pca,
            averaged_adjacency,
            averaged_threshold,
            averaged_centralities,
            pca_full,
        })
    }

    pub fn window_count(&self) -> usize {
        self.adjacencies.len()
    }

    pub fn dci(&self) -> TimeIndexed<f64> {
        self.indicators.map(|i| i.dci)
    }

    pub fn connections_in_out(&self) -> TimeIndexed<f64> {
        self.indicators.map(|i| i.connections_in_out)
    }

    /// Cross-group connection series; `None` without a group partition.
    pub fn connections_in_out_other(&self) -> Option<TimeIndexed<f64>> {
        if self.indicators.present().all(|i| i.connections_in_out_other.is_none()) {
            return None;
        }
        Some(self.indicators.map(|i| i.connections_in_out_other.unwrap_or_default()))
    }

    /// One centrality measure over time.
    pub fn centrality_series(&self, measure: CentralityMeasure) -> TimeIndexed<Array1<f64>> {
        self.centralities.map(|c| measure.select(c).clone())
    }
}

/// Mean adjacency over windows, binarized at the mean of its entries.
///
/// Returns the binary matrix and the threshold used.
pub fn average_and_binarize(adjacencies: &[Array2<f64>]) -> (Array2<f64>, f64) {
    let Some(first) = adjacencies.first() else {
        return (Array2::zeros((0, 0)), 0.0);
    };
    let mut mean = Array2::<f64>::zeros(first.dim());
    for adj in adjacencies {
        mean += adj;
    }
    mean /= adjacencies.len() as f64;
    let threshold = mean.mean().unwrap_or(0.0);
    if threshold <= 0.0 {
        return (Array2::zeros(mean.dim()), threshold);
    }
    (mean.mapv(|v| if v >= threshold { 1.0 } else { 0.0 }), threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Averaging identical binary matrices reproduces the matrix exactly,
    // including entries equal to the threshold.
    fn average_of_identical_matrices_is_identity_map() {
        // Arrange
        let adj = array![[0.0, 1.0, 1.0], [0.0, 0.0, 1.0], [1.0, 0.0, 0.0]];
        let windows = vec![adj.clone(); 5];

        // Act
        let (avg, threshold) = average_and_binarize(&windows);

        // Assert
        assert_eq!(avg, adj);
        assert!((threshold - 4.0 / 9.0).abs() < 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Frequent edges survive the mean threshold and rare ones do not; an
    // edgeless history stays edgeless.
    fn average_thresholds_at_global_mean() {
        // Arrange
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let b = array![[0.0, 1.0], [0.0, 0.0]];
        let empty = vec![Array2::<f64>::zeros((2, 2)); 3];

        // Act
        let (avg, threshold) = average_and_binarize(&[a, b.clone(), b.clone(), b]);
        let (none, zero) = average_and_binarize(&empty);

        // Assert: mean matrix [[0, 1], [0.25, 0]] with mean 0.3125.
        assert!((threshold - 0.3125).abs() < 1e-12);
        assert_eq!(avg, array![[0.0, 1.0], [0.0, 0.0]]);
        assert_eq!(none, Array2::<f64>::zeros((2, 2)));
        assert_eq!(zero, 0.0);
    }

    #[test]
    // Purpose
    // -------
    // TimeIndexed keeps explicit gaps and ignores out-of-range writes.
    fn time_indexed_tracks_missing_entries() {
        let mut s = TimeIndexed::<f64>::missing(5);
        s.set(3, 1.5);
        s.set(9, 2.0);
        assert_eq!(s.len(), 5);
        assert_eq!(s.first_index(), Some(3));
        assert_eq!(s.get(2), None);
        assert_eq!(s.get(3), Some(&1.5));
        assert_eq!(s.present().count(), 1);
        assert_eq!(s.map(|v| v * 2.0).get(3), Some(&3.0));
    }
}
