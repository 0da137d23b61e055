//! network — causal adjacency matrices, centralities and indicators.
//!
//! Purpose
//! -------
//! Build directed connectedness networks from return windows and describe
//! them at the node level (centralities) and the system level (indicators).
//!
//! Key behaviors
//! -------------
//! - [`CausalAdjacencyBuilder`] assembles a binary Granger network from
//!   `N(N−1)` pairwise tests run in parallel.
//! - [`Centralities::compute`] evaluates betweenness, closeness, degree,
//!   eigenvector, Katz and clustering measures on one snapshot.
//! - [`Indicators::compute`] returns DCI and the connection counts, with
//!   the cross-group variant driven by a [`GroupPartition`].
//!
//! Conventions
//! -----------
//! - Row = source, column = target for every adjacency matrix in the crate.
//! - Failures are reported as [`NetworkError`].

pub mod adjacency;
pub mod centrality;
pub mod errors;
pub mod indicators;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::adjacency::{CausalAdjacencyBuilder, is_symmetric, validate_adjacency};
pub use self::centrality::{
    BETWEENNESS_MAX_DEPTH, Centralities, Degrees, KATZ_ALPHA, betweenness_centrality, closeness_centrality,
    clustering_coefficients, degree_centrality, degrees, eigenvector_centrality, katz_centrality,
};
pub use self::errors::{NetworkError, NetworkResult};
pub use self::indicators::{GroupPartition, Indicators};

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::adjacency::CausalAdjacencyBuilder;
    pub use super::centrality::Centralities;
    pub use super::errors::{NetworkError, NetworkResult};
    pub use super::indicators::{GroupPartition, Indicators};
}
