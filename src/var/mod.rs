//! var — vector autoregressions and forecast error variance decomposition.
//!
//! Purpose
//! -------
//! Implement the variance-decomposition view of connectedness: fit a
//! VAR(p) with intercept to a return window, derive its moving-average
//! representation, and split each entity's forecast-error variance across
//! shock sources (generalized or orthogonal identification).
//!
//! Key behaviors
//! -------------
//! - [`VarModel`] estimates `c, A₁..A_p, Σ` by OLS and exposes the
//!   companion matrix and `Ψ₀..Ψ_{h−1}` as a fixed-length `Vec`.
//! - [`VarianceDecomposer`] (configured by [`FevdOptions`]) produces a
//!   [`VarianceDecomposition`] holding one `N×N` table per horizon step.
//! - Failures surface as [`VarError`]; the crate-level error classifies
//!   them as model-fit errors.
//!
//! Conventions
//! -----------
//! - FEVD tables: row = receiving entity, column = shock source, rows sum
//!   to one.
//! - Spillover networks: row = source, column = target, zero diagonal.
//!
//! Testing notes
//! -------------
//! - Closed-form 2-entity checks, MA recursion checks for p = 2 and p = 3,
//!   and row-sum checks on estimated models live in the submodules.

pub mod errors;
pub mod fevd;
pub mod model;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{VarError, VarResult};
pub use self::fevd::{FevdOptions, MAX_HORIZON, MAX_LAGS, VarianceDecomposer, VarianceDecomposition};
pub use self::model::VarModel;

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::errors::{VarError, VarResult};
    pub use super::fevd::{FevdOptions, VarianceDecomposer, VarianceDecomposition};
    pub use super::model::VarModel;
}
