//! statistical_tests — pairwise causality tests and their input guards.
//!
//! Purpose
//! -------
//! Collect the hypothesis tests used to build causal networks. This subtree
//! currently implements the lag-1 Granger-causality test together with
//! shared input validation and error handling.
//!
//! Key behaviors
//! -------------
//! - Expose the Granger test via [`GrangerOutcome`] and its constructor
//!   [`GrangerOutcome::granger_causality`](granger::GrangerOutcome::granger_causality),
//!   configured by [`GrangerOptions`] (classical or HAC-robust variance).
//! - Centralize pair guards in [`validate_pair`].
//! - Provide [`GrangerError`] and [`GrangerResult`] for every failure.
//!
//! Invariants & assumptions
//! ------------------------
//! - Tests never panic on user-facing invalid inputs; they report
//!   [`GrangerError`] values.
//! - [`GrangerError`] is small and cloneable, so it can cross thread
//!   boundaries inside the parallel adjacency builder.
//!
//! Downstream usage
//! ----------------
//! - `network::adjacency::CausalAdjacencyBuilder` calls
//!   [`GrangerOutcome::granger_causality`](granger::GrangerOutcome::granger_causality)
//!   for every ordered pair `(i, j)`, `i ≠ j`, and thresholds the p-value.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`validation`] exercise every guard.
//! - Unit tests in [`granger`] cover detection, non-detection, the
//!   constant-series convention and error propagation.

pub mod errors;
pub mod granger;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{GrangerError, GrangerResult};
pub use self::granger::{GrangerOptions, GrangerOutcome};
pub use self::validation::validate_pair;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{GrangerError, GrangerResult};
    pub use super::granger::{GrangerOptions, GrangerOutcome};
}
