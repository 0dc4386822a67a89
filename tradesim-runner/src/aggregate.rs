//! Run aggregator: many independent trials reduced to best, worst and
//! median paths.
//!
//! Every run `i` draws from its own `StdRng`, seeded by the RNG hierarchy
//! from `(master_seed, "run", i)`. Runs may execute on rayon workers in any
//! order; they are collected back into run-index order and reduced by a
//! single sequential merge, so the same master seed yields the same result
//! for any thread count.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tradesim_core::{
    simulate, OutcomeSequence, RngHierarchy, RunResult, SimError, SimulationConfig, Trajectory,
    REPRESENTATIVE_STREAM, RUN_STREAM,
};

use crate::stats::median_trajectory;

/// Finalized output of one aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Run with the strictly greatest final balance (first seen on ties).
    pub best: RunResult,
    pub best_run_index: usize,
    /// Run with the strictly least final balance (first seen on ties).
    pub worst: RunResult,
    pub worst_run_index: usize,
    /// Per-index median balance across all runs.
    pub median: Trajectory,
    /// Outcomes of one extra, independent run with the same config.
    ///
    /// Illustrative only: the median path is synthetic and has no outcome
    /// sequence of its own, so these flags do not generate `median`.
    pub representative: OutcomeSequence,
    /// Every run's trajectory, in run-index order.
    pub all_trajectories: Vec<Trajectory>,
    /// Master seed actually used. Feeding it back reproduces this result.
    pub master_seed: u64,
    pub initial_capital: f64,
}

impl AggregateResult {
    pub fn run_count(&self) -> usize {
        self.all_trajectories.len()
    }
}

/// Incremental best/worst tracker. Feed runs in run-index order.
#[derive(Debug, Clone, Copy, Default)]
struct Extremes {
    best: Option<(usize, f64)>,
    worst: Option<(usize, f64)>,
}

impl Extremes {
    fn observe(&mut self, index: usize, final_balance: f64) {
        if self.best.map_or(true, |(_, b)| final_balance > b) {
            self.best = Some((index, final_balance));
        }
        if self.worst.map_or(true, |(_, w)| final_balance < w) {
            self.worst = Some((index, final_balance));
        }
    }
}

/// Drives `config.num_runs` independent trials.
#[derive(Debug, Clone)]
pub struct Aggregator {
    config: SimulationConfig,
    parallel: bool,
    cancel: Option<Arc<AtomicBool>>,
}

impl Aggregator {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            parallel: true,
            cancel: None,
        }
    }

    /// Enables or disables parallel execution. Results do not depend on it.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Checked before each run starts. Raising the flag aborts the
    /// aggregation with `SimError::Cancelled`.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run(&self) -> Result<AggregateResult, SimError> {
        self.run_with_progress(|_, _| {})
    }

    /// Runs the aggregation, invoking `progress(completed, total)` once per
    /// finished run. Under parallel execution calls may arrive from any
    /// worker thread.
    pub fn run_with_progress<F>(&self, progress: F) -> Result<AggregateResult, SimError>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        self.config.validate()?;

        let rngs = RngHierarchy::from_optional_seed(self.config.seed);
        let total = self.config.num_runs;
        let completed = AtomicUsize::new(0);

        debug!(
            master_seed = rngs.master_seed(),
            runs = total,
            trades = self.config.num_trades,
            parallel = self.parallel,
            "starting aggregation"
        );

        let run_one = |index: usize| -> Result<RunResult, SimError> {
            if self.is_cancelled() {
                return Err(SimError::Cancelled {
                    completed: completed.load(Ordering::Relaxed),
                });
            }
            let mut rng = rngs.rng_for(RUN_STREAM, index as u64);
            let run = simulate(&self.config, &mut rng)?;
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            progress(done, total);
            Ok(run)
        };

        let runs: Vec<RunResult> = if self.parallel {
            (0..total)
                .into_par_iter()
                .map(run_one)
                .collect::<Result<Vec<_>, _>>()?
        } else {
            (0..total).map(run_one).collect::<Result<Vec<_>, _>>()?
        };

        let mut rng = rngs.rng_for(REPRESENTATIVE_STREAM, 0);
        let representative = simulate(&self.config, &mut rng)?.outcomes;

        let result = merge(
            runs,
            representative,
            rngs.master_seed(),
            self.config.initial_capital,
        );

        debug!(
            best_run = result.best_run_index,
            best_final = result.best.final_balance(),
            worst_run = result.worst_run_index,
            worst_final = result.worst.final_balance(),
            "aggregation finished"
        );

        Ok(result)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Run `config.num_runs` trials in parallel and aggregate them.
pub fn aggregate(config: &SimulationConfig) -> Result<AggregateResult, SimError> {
    Aggregator::new(config.clone()).run()
}

/// Single merge point: select extremes in run-index order, then compute the
/// median across every trajectory.
///
/// `runs` must be non-empty; config validation guarantees at least one run.
fn merge(
    runs: Vec<RunResult>,
    representative: OutcomeSequence,
    master_seed: u64,
    initial_capital: f64,
) -> AggregateResult {
    let mut extremes = Extremes::default();
    for (index, run) in runs.iter().enumerate() {
        extremes.observe(index, run.final_balance());
    }
    let (best_run_index, _) = extremes.best.unwrap_or_default();
    let (worst_run_index, _) = extremes.worst.unwrap_or_default();

    let best = runs[best_run_index].clone();
    let worst = runs[worst_run_index].clone();
    let all_trajectories: Vec<Trajectory> = runs.into_iter().map(|r| r.trajectory).collect();
    let median = median_trajectory(&all_trajectories);

    AggregateResult {
        best,
        best_run_index,
        worst,
        worst_run_index,
        median,
        representative,
        all_trajectories,
        master_seed,
        initial_capital,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradesim_core::Sizing;

    fn run_with_final(final_balance: f64) -> RunResult {
        RunResult {
            trajectory: vec![1000.0, final_balance],
            outcomes: vec![true, final_balance >= 1000.0],
        }
    }

    #[test]
    fn extremes_keep_first_seen_on_ties() {
        let mut e = Extremes::default();
        for (i, f) in [5.0, 9.0, 1.0, 9.0, 1.0].into_iter().enumerate() {
            e.observe(i, f);
        }
        assert_eq!(e.best, Some((1, 9.0)));
        assert_eq!(e.worst, Some((2, 1.0)));
    }

    #[test]
    fn single_observation_is_both_extremes() {
        let mut e = Extremes::default();
        e.observe(0, 42.0);
        assert_eq!(e.best, Some((0, 42.0)));
        assert_eq!(e.worst, Some((0, 42.0)));
    }

    #[test]
    fn merge_selects_best_worst_and_median() {
        let runs = vec![
            run_with_final(1100.0),
            run_with_final(900.0),
            run_with_final(1300.0),
            run_with_final(1300.0),
            run_with_final(900.0),
        ];
        let result = merge(runs, vec![true, false], 7, 1000.0);

        assert_eq!(result.best_run_index, 2);
        assert_eq!(result.worst_run_index, 1);
        assert_eq!(result.best.final_balance(), 1300.0);
        assert_eq!(result.worst.final_balance(), 900.0);
        assert_eq!(result.median, vec![1000.0, 1100.0]);
        assert_eq!(result.run_count(), 5);
        assert_eq!(result.representative, vec![true, false]);
        assert_eq!(result.master_seed, 7);
    }

    #[test]
    fn all_equal_finals_pick_run_zero() {
        let runs = vec![run_with_final(1000.0); 4];
        let result = merge(runs, Vec::new(), 0, 1000.0);
        assert_eq!(result.best_run_index, 0);
        assert_eq!(result.worst_run_index, 0);
    }

    #[test]
    fn builder_defaults_to_parallel() {
        let agg = Aggregator::new(SimulationConfig {
            sizing: Sizing::FixedAmount(1.0),
            ..SimulationConfig::default()
        });
        assert!(agg.parallel);
        assert!(!agg.is_cancelled());
        assert!(!agg.with_parallelism(false).parallel);
    }
}
