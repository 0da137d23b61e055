//! rolling::orchestrator — parallel dispatch of window tasks.
//!
//! Purpose
//! -------
//! Drive a complete rolling connectedness run: validate the configuration
//! against the data, fan one task per window out to a worker pool, collect
//! results in window order, honor cooperative cancellation, and hand the
//! complete set to the aggregator.
//!
//! Key behaviors
//! -------------
//! - Tasks run on a dedicated `rayon::ThreadPool`; the return matrix and
//!   task configuration are shared read-only through `Arc`.
//! - Results come back over an `mpsc` channel as `(window, result)` and are
//!   slotted by window index, so completion order is irrelevant.
//! - The cancellation token is polled before dispatch, before every
//!   receive, and after every receive. On cancellation or on the first task
//!   failure an internal abort flag makes queued tasks skip their work and
//!   the run returns without an aggregate.
//! - Progress is reported on the calling thread as the completed fraction.
//!
//! Invariants & assumptions
//! ------------------------
//! - State transitions follow
//!   `Idle → Dispatching → Awaiting(k) → Aggregating | Cancelled → Done`;
//!   a failed run also ends in `Done` without passing through
//!   `Aggregating`.
//! - Nothing observable is produced by a cancelled or failed run.

use crate::{
    errors::{ConnectednessError, ConnectednessResult},
    network::adjacency::CausalAdjacencyBuilder,
    rolling::{
        aggregate::AggregatedDataset,
        cancel::CancellationToken,
        data::ReturnDataset,
        options::RollingOptions,
        window::{WindowResult, WindowTask, window_count, window_view},
    },
    var::fevd::VarianceDecomposer,
};
use ndarray::Array2;
use rayon::ThreadPoolBuilder;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
    mpsc,
};
use tracing::{debug, info, warn};

/// RunState — lifecycle of a [`WindowOrchestrator`] run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Dispatching,
    /// Waiting for `k` outstanding windows.
    Awaiting(usize),
    Aggregating,
    Cancelled,
    Done,
}

/// WindowOrchestrator — runs the rolling pipeline for one configuration.
#[derive(Debug, Clone)]
pub struct WindowOrchestrator {
    options: RollingOptions,
    state: RunState,
}

impl WindowOrchestrator {
    pub fn new(options: RollingOptions) -> Self {
        WindowOrchestrator { options, state: RunState::Idle }
    }

    pub fn options(&self) -> &RollingOptions {
        &self.options
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug!(event_type = "run_state", from = ?self.state, to = ?next, "Orchestrator state change");
        self.state = next;
    }

    /// Execute a full run over `dataset`.
    ///
    /// Parameters
    /// ----------
    /// - `dataset`: validated return data.
    /// - `cancel`: cooperative cancellation token, may be set from any thread.
    /// - `progress`: called on this thread with the completed fraction in
    ///   `(0, 1]` after every finished window.
    ///
    /// Returns
    /// -------
    /// `ConnectednessResult<AggregatedDataset>`
    ///
    /// Errors
    /// ------
    /// - Configuration errors before any work starts.
    /// - `ConnectednessError::Cancelled` when the token is set mid-run.
    /// - `ConnectednessError::Window { .. }` wrapping the first task failure.
    /// - `ConnectednessError::WorkerPool` / `TaskLost` for pool failures.
    pub fn run<F>(
        &mut self, dataset: &ReturnDataset, cancel: &CancellationToken, mut progress: F,
    ) -> ConnectednessResult<AggregatedDataset>
    where
        F: FnMut(f64),
    {
        self.state = RunState::Idle;
        let result = self.execute(dataset, cancel, &mut progress);
        match &result {
            Err(ConnectednessError::Cancelled) => {
                self.transition(RunState::Cancelled);
                warn!(event_type = "run_cancelled", "Connectedness run cancelled");
            }
            Err(err) => warn!(event_type = "run_failed", error = %err, "Connectedness run failed"),
            Ok(_) => {}
        }
        self.transition(RunState::Done);
        result
    }

    fn execute(
        &mut self, dataset: &ReturnDataset, cancel: &CancellationToken, progress: &mut dyn FnMut(f64),
    ) -> ConnectednessResult<AggregatedDataset> {
        let options = self.options;
        options.validate_for(dataset.t())?;
        let bandwidth = options.bandwidth();
        let total = window_count(dataset.t(), bandwidth);
        let threads = options.worker_threads();

        let task = Arc::new(WindowTask::new(
            CausalAdjacencyBuilder::new(options.significance(), options.granger_options())?,
            VarianceDecomposer::new(options.fevd_options()?),
            dataset.partition().cloned(),
        ));
        let returns: Arc<Array2<f64>> = Arc::new(dataset.returns().to_owned());

        info!(
            event_type = "run_start",
            windows = total,
            entities = dataset.n(),
            bandwidth,
            threads,
            robust = options.robust(),
            "Starting connectedness run"
        );

        if cancel.is_cancelled() {
            return Err(ConnectednessError::Cancelled);
        }

        self.transition(RunState::Dispatching);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("connectedness-{i}"))
            .build()
            .map_err(|e| ConnectednessError::WorkerPool { reason: e.to_string() })?;
        let abort = Arc::new(AtomicBool::new(false));
        let (tx, rx) = mpsc::channel::<(usize, ConnectednessResult<WindowResult>)>();

        for index in 0..total {
            let tx = tx.clone();
            let task = Arc::clone(&task);
            let returns = Arc::clone(&returns);
            let abort = Arc::clone(&abort);
            let cancel = cancel.clone();
            pool.spawn(move || {
                if abort.load(Ordering::SeqCst) || cancel.is_cancelled() {
                    let _ = tx.send((index, Err(ConnectednessError::Cancelled)));
                    return;
                }
                let window = window_view(returns.view(), index, bandwidth);
                let result = task.run(index, window).map_err(|e| e.in_window(index));
                let _ = tx.send((index, result));
            });
        }
        drop(tx);

        let mut slots: Vec<Option<WindowResult>> = (0..total).map(|_| None).collect();
        let mut completed = 0usize;
        while completed < total {
            self.transition(RunState::Awaiting(total - completed));
            if cancel.is_cancelled() {
                abort.store(true, Ordering::SeqCst);
                return Err(ConnectednessError::Cancelled);
            }
            let Ok((index, result)) = rx.recv() else {
                abort.store(true, Ordering::SeqCst);
                let window = slots.iter().position(Option::is_none).unwrap_or(total);
                return Err(ConnectednessError::TaskLost { window });
            };
            if cancel.is_cancelled() {
                abort.store(true, Ordering::SeqCst);
                return Err(ConnectednessError::Cancelled);
            }
            match result {
                Ok(window_result) => {
                    slots[index] = Some(window_result);
                    completed += 1;
                    debug!(event_type = "window_done", window = index, completed, total, "Window finished");
                    progress(completed as f64 / total as f64);
                }
                Err(err) => {
                    abort.store(true, Ordering::SeqCst);
                    warn!(event_type = "window_failed", window = index, error = %err, "Window task failed");
                    return Err(err);
                }
            }
        }

        self.transition(RunState::Aggregating);
        let results: Vec<WindowResult> = slots.into_iter().flatten().collect();
        let aggregated = AggregatedDataset::from_windows(dataset, &options, results)?;
        info!(
            event_type = "run_complete",
            windows = aggregated.window_count(),
            averaged_threshold = aggregated.averaged_threshold,
            "Connectedness run complete"
        );
        Ok(aggregated)
    }
}

/// Run the rolling connectedness pipeline with a fresh orchestrator.
///
/// Examples
/// --------
/// ```rust,no_run
/// # use systemic_connectedness::rolling::{CancellationToken, ReturnDataset, RollingOptions, run_connectedness};
/// # fn demo(dataset: &ReturnDataset) -> Result<(), Box<dyn std::error::Error>> {
/// let token = CancellationToken::new();
/// let result = run_connectedness(dataset, &RollingOptions::default(), &token, |f| println!("{:.0}%", f * 100.0))?;
/// println!("{} windows", result.window_count());
/// # Ok(())
/// # }
/// ```
pub fn run_connectedness<F>(
    dataset: &ReturnDataset, options: &RollingOptions, cancel: &CancellationToken, progress: F,
) -> ConnectednessResult<AggregatedDataset>
where
    F: FnMut(f64),
{
    WindowOrchestrator::new(*options).run(dataset, cancel, progress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, Normal};

    fn dataset(t: usize, n: usize, seed: u64) -> ReturnDataset {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 0.01).expect("valid normal");
        let returns = Array2::from_shape_fn((t, n), |_| normal.sample(&mut rng));
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).expect("valid date");
        let dates = start.iter_days().take(t).collect();
        let names = (0..n).map(|i| format!("E{i}")).collect();
        ReturnDataset::new(dates, names, returns).expect("valid dataset")
    }

    #[test]
    // Purpose
    // -------
    // A small run completes, reports monotone progress ending at 1, and
    // places results from time index bandwidth − 1 on.
    fn orchestrator_completes_and_reports_progress() {
        // Arrange
        let ds = dataset(45, 3, 1);
        let options = RollingOptions::new(40, 0.05, false, 0.06, 1, 2, true)
            .and_then(|o| o.with_threads(2))
            .expect("valid options");
        let mut orchestrator = WindowOrchestrator::new(options);
        let mut seen = Vec::new();

        // Act
        let out = orchestrator
            .run(&ds, &CancellationToken::new(), |f| seen.push(f))
            .expect("run completes");

        // Assert
        assert_eq!(orchestrator.state(), RunState::Done);
        assert_eq!(out.window_count(), 6);
        assert_eq!(seen.len(), 6);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(seen.last().copied(), Some(1.0));
        assert_eq!(out.dci().first_index(), Some(39));
        assert_eq!(out.dci().present().count(), 6);
    }

    #[test]
    // Purpose
    // -------
    // A token cancelled before the run yields `Cancelled` and no progress.
    fn orchestrator_respects_pre_cancelled_token() {
        // Arrange
        let ds = dataset(45, 3, 2);
        let options = RollingOptions::new(40, 0.05, false, 0.06, 1, 2, true).expect("valid options");
        let token = CancellationToken::new();
        token.cancel();
        let mut orchestrator = WindowOrchestrator::new(options);
        let mut calls = 0;

        // Act
        let out = orchestrator.run(&ds, &token, |_| calls += 1);

        // Assert
        assert_eq!(out, Err(ConnectednessError::Cancelled));
        assert_eq!(calls, 0);
        assert_eq!(orchestrator.state(), RunState::Done);
    }

    #[test]
    // Purpose
    // -------
    // A bandwidth longer than the sample is rejected before dispatch.
    fn orchestrator_rejects_bandwidth_above_sample() {
        let ds = dataset(35, 3, 3);
        let options = RollingOptions::new(40, 0.05, false, 0.06, 1, 2, true).expect("valid options");
        let out = run_connectedness(&ds, &options, &CancellationToken::new(), |_| {});
        assert_eq!(
            out,
            Err(ConnectednessError::InvalidBandwidth { bandwidth: 40, observations: Some(35) })
        );
    }
}
