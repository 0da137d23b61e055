//! rolling — the rolling-window connectedness pipeline.
//!
//! Purpose
//! -------
//! Turn a `T×N` return matrix into time series of network indicators,
//! centralities, spillover totals and principal components, one value per
//! rolling window, plus whole-sample summaries.
//!
//! Key behaviors
//! -------------
//! - [`ReturnDataset`] validates the input once; [`RollingOptions`] does the
//!   same for every setting.
//! - [`WindowTask`] computes one window; [`WindowOrchestrator`] runs all of
//!   them on a worker pool with progress reporting and cooperative
//!   cancellation through a [`CancellationToken`].
//! - [`AggregatedDataset`] places window results on the time axis and adds
//!   the averaged network and whole-sample PCA.
//!
//! Downstream usage
//! ----------------
//! - Most callers only need [`run_connectedness`].

pub mod aggregate;
pub mod cancel;
pub mod data;
pub mod options;
pub mod orchestrator;
pub mod window;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::aggregate::{AggregatedDataset, CentralityMeasure, TimeIndexed, average_and_binarize};
pub use self::cancel::CancellationToken;
pub use self::data::ReturnDataset;
pub use self::options::{MAX_SIGNIFICANCE, MIN_BANDWIDTH, RollingOptions, THREADS_ENV_VAR};
pub use self::orchestrator::{RunState, WindowOrchestrator, run_connectedness};
pub use self::window::{WindowResult, WindowTask, window_count, window_view};

// ---- Optional convenience prelude for downstream crates ------------------

pub mod prelude {
    pub use super::aggregate::{AggregatedDataset, CentralityMeasure};
    pub use super::cancel::CancellationToken;
    pub use super::data::ReturnDataset;
    pub use super::options::RollingOptions;
    pub use super::orchestrator::run_connectedness;
}
