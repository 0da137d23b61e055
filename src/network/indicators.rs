//! network::indicators — system-wide connectedness indicators.
//!
//! Purpose
//! -------
//! Summarize an adjacency matrix with scalar measures of how densely the
//! system is connected: the Dynamic Causality Index, the in/out connection
//! count, and its variant that only counts links crossing group boundaries.
//!
//! Key behaviors
//! -------------
//! - `DCI = Σ adj / (N² − N)`.
//! - `ConnectionsInOut = (Σ in-degree + Σ out-degree) / (2(N − 1))`.
//! - `ConnectionsInOutOther`: every entity's in/out degree minus the links
//!   to members of its own group, summed and divided by
//!   `2 · groups · (N / groups)`. Only computed for a non-trivial
//!   [`GroupPartition`].
//!
//! Conventions
//! -----------
//! - Group boundaries are 0-based exclusive start indices of each group
//!   after the first: `[2, 5]` over `N = 8` gives `{0, 1}`, `{2, 3, 4}`,
//!   `{5, 6, 7}`.

use crate::network::{
    adjacency::validate_adjacency,
    errors::{NetworkError, NetworkResult},
};
use ndarray::{ArrayView2, Axis};
use std::ops::Range;

/// GroupPartition — contiguous grouping of `N` ordered entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupPartition {
    boundaries: Vec<usize>,
    entities: usize,
}

impl GroupPartition {
    /// Build a partition from group start indices.
    ///
    /// Errors
    /// ------
    /// - `NetworkError::InvalidPartition` unless the boundaries are strictly
    ///   increasing and each lies in `[1, entities)`.
    pub fn new(boundaries: Vec<usize>, entities: usize) -> NetworkResult<Self> {
        let in_range = boundaries.iter().all(|&b| b >= 1 && b < entities);
        let increasing = boundaries.windows(2).all(|w| w[0] < w[1]);
        if !(in_range && increasing) {
            return Err(NetworkError::InvalidPartition { boundaries, entities });
        }
        Ok(GroupPartition { boundaries, entities })
    }

    pub fn boundaries(&self) -> &[usize] {
        &self.boundaries
    }

    pub fn entities(&self) -> usize {
        self.entities
    }

    pub fn group_count(&self) -> usize {
        self.boundaries.len() + 1
    }

    /// `true` when there are no boundaries (a single group).
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Group index of entity `idx`.
    pub fn group_of(&self, idx: usize) -> usize {
        self.boundaries.partition_point(|&b| b <= idx)
    }

    /// Entity range of group `g`.
    pub fn group_range(&self, g: usize) -> Range<usize> {
        let start = if g == 0 { 0 } else { self.boundaries[g - 1] };
        let end = self.boundaries.get(g).copied().unwrap_or(self.entities);
        start..end
    }
}

/// Indicators — scalar connectedness summaries of one adjacency matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Indicators {
    pub dci: f64,
    pub connections_in_out: f64,
    pub connections_in_out_other: Option<f64>,
}

impl Indicators {
    /// Compute all indicators for `adj`.
    ///
    /// Parameters
    /// ----------
    /// - `adj`: `ArrayView2<f64>`, `N×N`, row = source.
    /// - `partition`: optional grouping; `None` or an empty partition leaves
    ///   `connections_in_out_other` unset.
    ///
    /// Errors
    /// ------
    /// - Shape errors from [`validate_adjacency`].
    /// - `NetworkError::PartitionSizeMismatch` when the partition was built
    ///   for a different `N`.
    pub fn compute(adj: ArrayView2<f64>, partition: Option<&GroupPartition>) -> NetworkResult<Self> {
        let n = validate_adjacency(adj)?;
        let nf = n as f64;
        let total = adj.sum();
        let in_degree = adj.sum_axis(Axis(0));
        let out_degree = adj.sum_axis(Axis(1));

        let dci = if n > 1 { total / (nf * nf - nf) } else { 0.0 };
        let connections_in_out =
            if n > 1 { (in_degree.sum() + out_degree.sum()) / (2.0 * (nf - 1.0)) } else { 0.0 };

        let connections_in_out_other = match partition {
            Some(p) if p.entities() != n => {
                return Err(NetworkError::PartitionSizeMismatch { partition: p.entities(), entities: n });
            }
            Some(p) if !p.is_empty() => {
                let mut cross = 0.0;
                for i in 0..n {
                    let own = p.group_range(p.group_of(i));
                    let in_own: f64 = own.clone().map(|k| adj[[k, i]]).sum();
                    let out_own: f64 = own.map(|k| adj[[i, k]]).sum();
                    cross += (in_degree[i] - in_own) + (out_degree[i] - out_own);
                }
                let groups = p.group_count() as f64;
                Some(cross / (2.0 * groups * (nf / groups)))
            }
            _ => None,
        };

        Ok(Indicators { dci, connections_in_out, connections_in_out_other })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    #[test]
    // Purpose
    // -------
    // Group lookup handles the first, interior and last groups.
    fn group_partition_lookup_covers_all_ranges() {
        // Arrange
        let p = GroupPartition::new(vec![2, 5], 8).expect("valid partition");

        // Act / Assert
        assert_eq!(p.group_count(), 3);
        assert_eq!((0..8).map(|i| p.group_of(i)).collect::<Vec<_>>(), vec![0, 0, 1, 1, 1, 2, 2, 2]);
        assert_eq!(p.group_range(0), 0..2);
        assert_eq!(p.group_range(1), 2..5);
        assert_eq!(p.group_range(2), 5..8);
        assert!(GroupPartition::new(vec![5, 2], 8).is_err());
        assert!(GroupPartition::new(vec![0], 8).is_err());
        assert!(GroupPartition::new(vec![8], 8).is_err());
    }

    #[test]
    // Purpose
    // -------
    // DCI and in/out counts on a complete graph, and the cross-group count
    // on a block graph.
    //
    // Given
    // -----
    // - Complete directed graph on 4 nodes.
    // - Two groups {0, 1} and {2, 3} with 0 → 1 (within) and 0 → 2, 1 → 3
    //   (across).
    //
    // Expect
    // ------
    // - Complete: DCI = 1, ConnectionsInOut = 24 / 6 = 4.
    // - Block: cross links counted once out and once in: (2 + 2) / 8.
    fn indicators_match_hand_counts() {
        // Arrange
        let full = Array2::from_shape_fn((4, 4), |(i, j)| if i == j { 0.0 } else { 1.0 });
        let mut block = Array2::<f64>::zeros((4, 4));
        block[[0, 1]] = 1.0;
        block[[0, 2]] = 1.0;
        block[[1, 3]] = 1.0;
        let groups = GroupPartition::new(vec![2], 4).expect("valid partition");

        // Act
        let full_ind = Indicators::compute(full.view(), None).expect("valid");
        let block_ind = Indicators::compute(block.view(), Some(&groups)).expect("valid");

        // Assert
        assert_relative_eq!(full_ind.dci, 1.0, epsilon = 1e-12);
        assert_relative_eq!(full_ind.connections_in_out, 4.0, epsilon = 1e-12);
        assert_eq!(full_ind.connections_in_out_other, None);
        assert_relative_eq!(block_ind.dci, 3.0 / 12.0, epsilon = 1e-12);
        assert_relative_eq!(block_ind.connections_in_out_other.expect("grouped"), 0.5, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Empty and mismatched partitions are handled explicitly.
    fn indicators_partition_edge_cases() {
        let adj = array![[0.0, 1.0], [0.0, 0.0]];
        let empty = GroupPartition::new(vec![], 2).expect("single group");
        let wrong = GroupPartition::new(vec![1], 3).expect("valid partition");

        let single = Indicators::compute(adj.view(), Some(&empty)).expect("valid");
        assert_eq!(single.connections_in_out_other, None);
        assert_eq!(
            Indicators::compute(adj.view(), Some(&wrong)),
            Err(NetworkError::PartitionSizeMismatch { partition: 3, entities: 2 })
        );
    }
}
