//! Trial engine: one simulated path of sequential trades.
//!
//! Each trade draws one uniform value. The trade wins iff the draw is
//! `<= win_rate`, so a draw landing exactly on the threshold is a win. Random
//! draws come from the open interval (0, 1): a win rate of 1 always wins and a
//! win rate of 0 never does. Balances are never floored:
//! a path can go negative and keeps trading for the full trade count.

use rand::distributions::Open01;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::SimError;

/// Balance after each trade. Index 0 is the balance after the first trade.
pub type Trajectory = Vec<f64>;

/// Win (`true`) / loss (`false`) flag per trade, index-aligned with a
/// [`Trajectory`].
pub type OutcomeSequence = Vec<bool>;

/// Source of uniform draws.
pub trait UniformSource {
    fn next_uniform(&mut self) -> Result<f64, SimError>;
}

/// Samples from (0, 1), so an exact 0.0 never reaches the threshold.
impl<R: Rng> UniformSource for R {
    fn next_uniform(&mut self) -> Result<f64, SimError> {
        Ok(self.sample(Open01))
    }
}

/// Bounded, pre-chosen sequence of draws.
///
/// Fails with [`SimError::RandomSourceExhausted`] once every draw is used.
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    draws: Vec<f64>,
    cursor: usize,
}

impl ScriptedDraws {
    pub fn new(draws: impl Into<Vec<f64>>) -> Self {
        Self {
            draws: draws.into(),
            cursor: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len() - self.cursor
    }
}

impl UniformSource for ScriptedDraws {
    fn next_uniform(&mut self) -> Result<f64, SimError> {
        let draw = self
            .draws
            .get(self.cursor)
            .copied()
            .ok_or(SimError::RandomSourceExhausted {
                drawn: self.cursor,
            })?;
        self.cursor += 1;
        Ok(draw)
    }
}

/// Output of one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub trajectory: Trajectory,
    pub outcomes: OutcomeSequence,
}

impl RunResult {
    /// Balance after the last trade.
    pub fn final_balance(&self) -> f64 {
        self.trajectory.last().copied().unwrap_or(f64::NAN)
    }

    pub fn len(&self) -> usize {
        self.trajectory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectory.is_empty()
    }
}

/// Balance after one trade that started at `balance`.
pub fn apply_trade(config: &SimulationConfig, balance: f64, won: bool) -> f64 {
    let risk = config
        .sizing
        .risk_amount(balance, config.concurrent_trades);
    if won {
        balance + risk * config.risk_to_reward
    } else {
        balance - risk
    }
}

/// Simulate `config.num_trades` sequential trades.
pub fn simulate<S: UniformSource>(
    config: &SimulationConfig,
    source: &mut S,
) -> Result<RunResult, SimError> {
    config.validate()?;

    let mut trajectory = Vec::with_capacity(config.num_trades);
    let mut outcomes = Vec::with_capacity(config.num_trades);
    let mut balance = config.initial_capital;

    for _ in 0..config.num_trades {
        let won = source.next_uniform()? <= config.win_rate;
        balance = apply_trade(config, balance, won);
        trajectory.push(balance);
        outcomes.push(won);
    }

    Ok(RunResult {
        trajectory,
        outcomes,
    })
}

/// Rebuild the trajectory a flag sequence produces under `config`.
///
/// Uses `outcomes.len()` rather than `config.num_trades`, so it also replays
/// prefixes.
pub fn replay(config: &SimulationConfig, outcomes: &[bool]) -> Trajectory {
    outcomes
        .iter()
        .scan(config.initial_capital, |balance, &won| {
            *balance = apply_trade(config, *balance, won);
            Some(*balance)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Sizing;
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fixed_config(win_rate: f64) -> SimulationConfig {
        SimulationConfig {
            initial_capital: 1000.0,
            win_rate,
            risk_to_reward: 15.0,
            sizing: Sizing::FixedAmount(10.0),
            num_trades: 5,
            concurrent_trades: 1,
            num_runs: 1,
            seed: None,
        }
    }

    #[test]
    fn all_wins_at_win_rate_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let run = simulate(&fixed_config(1.0), &mut rng).unwrap();
        assert_eq!(run.outcomes, vec![true; 5]);
        assert_eq!(run.trajectory, vec![1150.0, 1300.0, 1450.0, 1600.0, 1750.0]);
    }

    #[test]
    fn all_losses_at_win_rate_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let run = simulate(&fixed_config(0.0), &mut rng).unwrap();
        assert_eq!(run.outcomes, vec![false; 5]);
        assert_eq!(run.trajectory, vec![990.0, 980.0, 970.0, 960.0, 950.0]);
    }

    #[test]
    fn draw_equal_to_win_rate_is_a_win() {
        let mut config = fixed_config(0.25);
        config.num_trades = 3;
        let mut draws = ScriptedDraws::new(vec![0.25, 0.2500001, 0.0]);
        let run = simulate(&config, &mut draws).unwrap();
        assert_eq!(run.outcomes, vec![true, false, true]);
        assert_eq!(draws.remaining(), 0);
    }

    #[test]
    fn zero_win_rate_loses_on_all_zero_bits() {
        // A generator stuck at zero is the only way to reach the bottom edge.
        let mut rng = StepRng::new(0, 0);
        let run = simulate(&fixed_config(0.0), &mut rng).unwrap();
        assert_eq!(run.outcomes, vec![false; 5]);
        assert_eq!(run.trajectory, vec![990.0, 980.0, 970.0, 960.0, 950.0]);
    }

    #[test]
    fn win_rate_one_wins_on_all_one_bits() {
        let mut rng = StepRng::new(u64::MAX, 0);
        let run = simulate(&fixed_config(1.0), &mut rng).unwrap();
        assert_eq!(run.outcomes, vec![true; 5]);
    }

    #[test]
    fn percent_sizing_splits_across_concurrent_trades() {
        let config = SimulationConfig {
            initial_capital: 1000.0,
            win_rate: 1.0,
            risk_to_reward: 15.0,
            sizing: Sizing::PercentOfBalance(10.0),
            num_trades: 1,
            concurrent_trades: 2,
            num_runs: 1,
            seed: None,
        };
        let run = simulate(&config, &mut ScriptedDraws::new(vec![0.5])).unwrap();
        assert!((run.trajectory[0] - 1750.0).abs() < 1e-9);
    }

    #[test]
    fn percent_sizing_compounds_on_losses() {
        let config = SimulationConfig {
            initial_capital: 1000.0,
            win_rate: 0.0,
            risk_to_reward: 2.0,
            sizing: Sizing::PercentOfBalance(10.0),
            num_trades: 2,
            concurrent_trades: 1,
            num_runs: 1,
            seed: None,
        };
        let run = simulate(&config, &mut ScriptedDraws::new(vec![0.9, 0.9])).unwrap();
        assert!((run.trajectory[0] - 900.0).abs() < 1e-9);
        assert!((run.trajectory[1] - 810.0).abs() < 1e-9);
    }

    #[test]
    fn balance_goes_negative_without_clamping() {
        let mut config = fixed_config(0.0);
        config.initial_capital = 15.0;
        config.num_trades = 3;
        let mut rng = StdRng::seed_from_u64(3);
        let run = simulate(&config, &mut rng).unwrap();
        assert_eq!(run.trajectory, vec![5.0, -5.0, -15.0]);
    }

    #[test]
    fn exhausted_source_is_an_error() {
        let err = simulate(&fixed_config(0.5), &mut ScriptedDraws::new(vec![0.1, 0.2])).unwrap_err();
        assert!(matches!(err, SimError::RandomSourceExhausted { drawn: 2 }));
    }

    #[test]
    fn invalid_config_rejected_before_drawing() {
        let mut config = fixed_config(0.5);
        config.num_trades = 0;
        let mut draws = ScriptedDraws::new(vec![0.1]);
        assert!(matches!(
            simulate(&config, &mut draws),
            Err(SimError::InvalidConfiguration(_))
        ));
        assert_eq!(draws.remaining(), 1);
    }

    #[test]
    fn replay_reproduces_simulated_trajectory() {
        let mut config = fixed_config(0.4);
        config.num_trades = 200;
        config.sizing = Sizing::PercentOfBalance(2.0);
        config.concurrent_trades = 4;
        let mut rng = StdRng::seed_from_u64(99);
        let run = simulate(&config, &mut rng).unwrap();
        assert_eq!(replay(&config, &run.outcomes), run.trajectory);
    }

    #[test]
    fn final_balance_is_last_entry() {
        let run = RunResult {
            trajectory: vec![1.0, 2.0, 3.0],
            outcomes: vec![true, true, true],
        };
        assert_eq!(run.final_balance(), 3.0);
        assert_eq!(run.len(), 3);
    }
}
