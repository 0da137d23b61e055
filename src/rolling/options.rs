//! rolling::options — validated configuration of a connectedness run.
//!
//! Purpose
//! -------
//! Collect and validate every user-facing setting of the rolling pipeline
//! before any computation starts, and derive the component-level options
//! (Granger, FEVD) and the worker-pool size from it.
//!
//! Key behaviors
//! -------------
//! - [`RollingOptions::new`] rejects out-of-range values with configuration
//!   errors: bandwidth ≥ 30, significance and `k` in `(0, 0.20]`, lags in
//!   `[1, 5]`, horizon in `[1, 15]`.
//! - [`RollingOptions::validate_for`] adds the data-dependent check
//!   `bandwidth ≤ T`.
//! - [`RollingOptions::worker_threads`] resolves the pool size: explicit
//!   override, then the `CONNECTEDNESS_THREADS` environment variable, then
//!   the available parallelism.

use crate::{
    errors::{ConnectednessError, ConnectednessResult},
    statistical_tests::granger::GrangerOptions,
    var::fevd::{FevdOptions, MAX_HORIZON, MAX_LAGS},
};
use std::{env, num::NonZeroUsize, thread};

/// Smallest accepted rolling-window length.
pub const MIN_BANDWIDTH: usize = 30;
/// Upper bound for the significance level and the causality threshold.
pub const MAX_SIGNIFICANCE: f64 = 0.20;
/// Environment variable overriding the worker-pool size.
pub const THREADS_ENV_VAR: &str = "CONNECTEDNESS_THREADS";

/// RollingOptions — validated run settings.
///
/// Fields
/// ------
/// - `bandwidth`: window length in observations.
/// - `significance`: Granger test level `α`.
/// - `robust`: HAC-robust p-values when `true`.
/// - `k`: causality threshold carried through for downstream display.
/// - `lags`, `horizon`, `generalized`: VAR/FEVD settings.
/// - `threads`: explicit worker-pool size, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingOptions {
    bandwidth: usize,
    significance: f64,
    robust: bool,
    k: f64,
    lags: usize,
    horizon: usize,
    generalized: bool,
    threads: Option<NonZeroUsize>,
}

impl RollingOptions {
    /// Validate and build run settings.
    ///
    /// Errors
    /// ------
    /// - `InvalidBandwidth` when `bandwidth < 30`.
    /// - `InvalidSignificance` / `InvalidCausalityThreshold` outside `(0, 0.20]`.
    /// - `InvalidLagOrder` outside `[1, 5]`; `InvalidHorizon` outside `[1, 15]`.
    pub fn new(
        bandwidth: usize, significance: f64, robust: bool, k: f64, lags: usize, horizon: usize, generalized: bool,
    ) -> ConnectednessResult<Self> {
        if bandwidth < MIN_BANDWIDTH {
            return Err(ConnectednessError::InvalidBandwidth { bandwidth, observations: None });
        }
        if !in_unit_band(significance) {
            return Err(ConnectednessError::InvalidSignificance { significance });
        }
        if !in_unit_band(k) {
            return Err(ConnectednessError::InvalidCausalityThreshold { k });
        }
        if !(1..=MAX_LAGS).contains(&lags) {
            return Err(ConnectednessError::InvalidLagOrder { lags });
        }
        if !(1..=MAX_HORIZON).contains(&horizon) {
            return Err(ConnectednessError::InvalidHorizon { horizon });
        }
        Ok(RollingOptions { bandwidth, significance, robust, k, lags, horizon, generalized, threads: None })
    }

    /// Fix the worker-pool size instead of resolving it from the environment.
    pub fn with_threads(mut self, threads: usize) -> ConnectednessResult<Self> {
        let threads = NonZeroUsize::new(threads).ok_or(ConnectednessError::InvalidThreads { threads })?;
        self.threads = Some(threads);
        Ok(self)
    }

    /// Data-dependent checks: the window must fit in the sample.
    pub fn validate_for(&self, observations: usize) -> ConnectednessResult<()> {
        if self.bandwidth > observations {
            return Err(ConnectednessError::InvalidBandwidth {
                bandwidth: self.bandwidth,
                observations: Some(observations),
            });
        }
        Ok(())
    }

    pub fn bandwidth(&self) -> usize {
        self.bandwidth
    }

    pub fn significance(&self) -> f64 {
        self.significance
    }

    pub fn robust(&self) -> bool {
        self.robust
    }

    pub fn causality_threshold(&self) -> f64 {
        self.k
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

    pub fn granger_options(&self) -> GrangerOptions {
        GrangerOptions::with_robust(self.robust)
    }

    pub fn fevd_options(&self) -> ConnectednessResult<FevdOptions> {
        Ok(FevdOptions::new(self.lags, self.horizon, self.generalized)?)
    }

    /// Resolved worker-pool size (always ≥ 1).
    pub fn worker_threads(&self) -> usize {
        if let Some(threads) = self.threads {
            return threads.get();
        }
        env::var(THREADS_ENV_VAR)
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, NonZeroUsize::get))
    }
}

impl Default for RollingOptions {
    fn default() -> Self {
        RollingOptions {
            bandwidth: 252,
            significance: 0.05,
            robust: false,
            k: 0.06,
            lags: 2,
            horizon: 4,
            generalized: true,
            threads: None,
        }
    }
}

fn in_unit_band(value: f64) -> bool {
    value > 0.0 && value <= MAX_SIGNIFICANCE
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    // Purpose
    // -------
    // Defaults lie inside every accepted range and round-trip through `new`.
    fn rolling_options_default_is_valid() {
        let d = RollingOptions::default();
        let rebuilt = RollingOptions::new(
            d.bandwidth(),
            d.significance(),
            d.robust(),
            d.causality_threshold(),
            d.lags(),
            d.horizon(),
            d.generalized(),
        )
        .expect("defaults are valid");
        assert_eq!(rebuilt, d);
        assert!(d.fevd_options().is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Every boundary violation is a configuration error naming the setting.
    //
    // Given
    // -----
    // - bandwidth 29, significance 0 and 0.21, k 0.25, lags 0 and 6,
    //   horizon 0 and 16, zero threads, bandwidth above T.
    //
    // Expect
    // ------
    // - The matching variant, always classified as `Configuration`.
    fn rolling_options_reject_out_of_range_values() {
        let cases = [
            RollingOptions::new(29, 0.05, false, 0.06, 2, 4, true),
            RollingOptions::new(252, 0.0, false, 0.06, 2, 4, true),
            RollingOptions::new(252, 0.21, false, 0.06, 2, 4, true),
            RollingOptions::new(252, 0.05, false, 0.25, 2, 4, true),
            RollingOptions::new(252, 0.05, false, 0.06, 0, 4, true),
            RollingOptions::new(252, 0.05, false, 0.06, 6, 4, true),
            RollingOptions::new(252, 0.05, false, 0.06, 2, 0, true),
            RollingOptions::new(252, 0.05, false, 0.06, 2, 16, true),
            RollingOptions::default().with_threads(0),
        ];
        for case in cases {
            let err = case.expect_err("out-of-range option");
            assert_eq!(err.kind(), ErrorKind::Configuration, "{err}");
        }
        assert!(matches!(
            RollingOptions::new(29, 0.05, false, 0.06, 2, 4, true),
            Err(ConnectednessError::InvalidBandwidth { bandwidth: 29, .. })
        ));
        assert_eq!(
            RollingOptions::default().validate_for(100),
            Err(ConnectednessError::InvalidBandwidth { bandwidth: 252, observations: Some(100) })
        );
        assert!(RollingOptions::new(30, 0.2, true, 0.2, 5, 15, false).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // An explicit thread count wins over the environment.
    fn worker_threads_prefers_explicit_override() {
        let opts = RollingOptions::default().with_threads(3).expect("positive threads");
        assert_eq!(opts.worker_threads(), 3);
        assert!(RollingOptions::default().worker_threads() >= 1);
    }
}
