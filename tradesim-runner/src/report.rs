//! Scenario summaries: the numbers behind the summary table.
//!
//! Every metric is a pure function of one trajectory, its outcome sequence
//! and the initial capital. Drawdown is measured from the initial capital to
//! the lowest balance reached, so it is negative when a path never dips below
//! its starting point.

use serde::{Deserialize, Serialize};

use tradesim_core::{analyze, SimulationConfig};

use crate::aggregate::AggregateResult;
use crate::stats::{median, percentile_sorted};

/// The three highlighted paths of an aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scenario {
    Best,
    Worst,
    MostLikely,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [Scenario::Best, Scenario::Worst, Scenario::MostLikely];

    pub fn label(&self) -> &'static str {
        match self {
            Scenario::Best => "Best",
            Scenario::Worst => "Worst",
            Scenario::MostLikely => "Most Likely",
        }
    }
}

/// One row of the summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub scenario: Scenario,
    pub start_balance: f64,
    pub end_balance: f64,
    pub return_pct: f64,
    pub max_drawdown_pct: f64,
    pub max_drawdown_abs: f64,
    pub max_consecutive_losses: usize,
    pub max_consecutive_wins: usize,
    /// Streaks come from the representative run, not from this trajectory.
    pub streaks_illustrative: bool,
}

impl ScenarioSummary {
    pub fn compute(
        scenario: Scenario,
        initial_capital: f64,
        trajectory: &[f64],
        outcomes: &[bool],
        streaks_illustrative: bool,
    ) -> Self {
        let end_balance = trajectory.last().copied().unwrap_or(initial_capital);
        let drawdown = max_drawdown_abs(initial_capital, trajectory);
        let streaks = analyze(outcomes);
        Self {
            scenario,
            start_balance: initial_capital,
            end_balance,
            return_pct: return_pct(initial_capital, end_balance),
            max_drawdown_pct: drawdown / initial_capital * 100.0,
            max_drawdown_abs: drawdown,
            max_consecutive_losses: streaks.max_consecutive_losses,
            max_consecutive_wins: streaks.max_consecutive_wins,
            streaks_illustrative,
        }
    }
}

/// Percentage return from `start` to `end`.
pub fn return_pct(start: f64, end: f64) -> f64 {
    (end - start) / start * 100.0
}

/// Initial capital minus the lowest balance of the trajectory.
pub fn max_drawdown_abs(initial_capital: f64, trajectory: &[f64]) -> f64 {
    let lowest = trajectory.iter().copied().fold(f64::INFINITY, f64::min);
    if lowest.is_finite() {
        initial_capital - lowest
    } else {
        0.0
    }
}

/// Shape of the final-balance distribution across all runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalBalanceStats {
    pub mean: f64,
    pub p5: f64,
    pub median: f64,
    pub p95: f64,
    /// Fraction of runs that ended below the initial capital.
    pub fraction_below_start: f64,
    /// Fraction of runs that ended with a negative balance.
    pub fraction_negative: f64,
}

impl FinalBalanceStats {
    pub fn compute(initial_capital: f64, finals: &[f64]) -> Self {
        if finals.is_empty() {
            return Self {
                mean: initial_capital,
                p5: initial_capital,
                median: initial_capital,
                p95: initial_capital,
                fraction_below_start: 0.0,
                fraction_negative: 0.0,
            };
        }
        let n = finals.len() as f64;
        let mut sorted = finals.to_vec();
        sorted.sort_by(f64::total_cmp);
        Self {
            mean: finals.iter().sum::<f64>() / n,
            p5: percentile_sorted(&sorted, 5.0),
            median: median(&sorted).unwrap_or(initial_capital),
            p95: percentile_sorted(&sorted, 95.0),
            fraction_below_start: finals.iter().filter(|&&f| f < initial_capital).count() as f64
                / n,
            fraction_negative: finals.iter().filter(|&&f| f < 0.0).count() as f64 / n,
        }
    }
}

/// Everything the summary table and the JSON manifest need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub config: SimulationConfig,
    pub master_seed: u64,
    pub runs: usize,
    pub scenarios: Vec<ScenarioSummary>,
    pub final_balances: FinalBalanceStats,
}

impl SimulationReport {
    pub fn from_result(config: &SimulationConfig, result: &AggregateResult) -> Self {
        let capital = result.initial_capital;
        let scenarios = Scenario::ALL
            .iter()
            .map(|&scenario| match scenario {
                Scenario::Best => ScenarioSummary::compute(
                    scenario,
                    capital,
                    &result.best.trajectory,
                    &result.best.outcomes,
                    false,
                ),
                Scenario::Worst => ScenarioSummary::compute(
                    scenario,
                    capital,
                    &result.worst.trajectory,
                    &result.worst.outcomes,
                    false,
                ),
                Scenario::MostLikely => ScenarioSummary::compute(
                    scenario,
                    capital,
                    &result.median,
                    &result.representative,
                    true,
                ),
            })
            .collect();

        let finals: Vec<f64> = result
            .all_trajectories
            .iter()
            .filter_map(|t| t.last().copied())
            .collect();

        Self {
            config: config.clone(),
            master_seed: result.master_seed,
            runs: result.run_count(),
            scenarios,
            final_balances: FinalBalanceStats::compute(capital, &finals),
        }
    }

    pub fn scenario(&self, scenario: Scenario) -> Option<&ScenarioSummary> {
        self.scenarios.iter().find(|s| s.scenario == scenario)
    }
}
