//! inference — OLS and robust coefficient covariances.
//!
//! Purpose
//! -------
//! The regression layer under the Granger test and the VAR estimator.
//! [`OlsFit`] solves one least-squares problem and can report either the
//! classical covariance or a HAC sandwich built from its scores.
//!
//! Key behaviors
//! -------------
//! - [`OlsFit::fit`] rejects short samples and collinear designs with an
//!   [`InferenceError`].
//! - [`long_run_covariance`] aggregates kernel-weighted score
//!   autocovariances under a [`HACOptions`] policy.
//! - [`KernelType`] supplies the tapers and the Andrews plug-in bandwidth,
//!   from per-column AR(1) fits by the `arima` crate.
//!
//! Conventions
//! -----------
//! - Designs and score matrices are `n × k`, rows = observations; callers
//!   include any intercept column themselves.
//! - Nothing here logs or panics on bad input.

pub mod errors;
pub mod hac;
pub mod kernel;
pub mod ols;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::errors::{InferenceError, InferenceResult};
pub use self::hac::{HACOptions, long_run_covariance};
pub use self::kernel::KernelType;
pub use self::ols::OlsFit;

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::hac::HACOptions;
    pub use super::kernel::KernelType;
    pub use super::ols::OlsFit;
}
