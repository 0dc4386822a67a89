//! Simulation parameters.
//!
//! A `SimulationConfig` is built once (from defaults, TOML, or CLI flags),
//! validated, and then passed by reference into every engine operation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of independent simulations when none is specified.
pub const DEFAULT_RUNS: usize = 1000;

/// How much is risked on each trade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum Sizing {
    /// Risk a fixed currency amount per trade.
    FixedAmount(f64),
    /// Risk a percentage (e.g. `1.0` = 1%) of the current balance, split
    /// across the concurrently open trades.
    PercentOfBalance(f64),
}

impl Sizing {
    /// Mode name as it appears in config files.
    pub fn mode_name(&self) -> &'static str {
        match self {
            Sizing::FixedAmount(_) => "fixed_amount",
            Sizing::PercentOfBalance(_) => "percent_of_balance",
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Sizing::FixedAmount(v) | Sizing::PercentOfBalance(v) => v,
        }
    }

    /// Percentage applied per trade after scaling by the concurrent trade
    /// count. `None` for fixed sizing, which is never scaled.
    pub fn effective_percent(&self, concurrent_trades: usize) -> Option<f64> {
        match *self {
            Sizing::FixedAmount(_) => None,
            Sizing::PercentOfBalance(percent) => Some(percent / concurrent_trades as f64),
        }
    }

    /// Currency amount lost on a losing trade at the given balance.
    ///
    /// A win pays this amount times the risk-to-reward ratio.
    pub fn risk_amount(&self, balance: f64, concurrent_trades: usize) -> f64 {
        match self.effective_percent(concurrent_trades) {
            Some(percent) => (percent / 100.0) * balance,
            None => self.value(),
        }
    }
}

/// Immutable parameters of one Monte Carlo study.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Starting balance of every trial.
    pub initial_capital: f64,
    /// Probability of a winning trade, in [0, 1].
    pub win_rate: f64,
    /// Profit multiple of the risked amount on a win (1:X).
    pub risk_to_reward: f64,
    pub sizing: Sizing,
    /// Trades per trial.
    pub num_trades: usize,
    /// Only scales percentage sizing.
    #[serde(default = "default_concurrent_trades")]
    pub concurrent_trades: usize,
    /// Independent trials per aggregation.
    #[serde(default = "default_runs")]
    pub num_runs: usize,
    /// Master seed. `None` draws a fresh one from OS entropy per aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_concurrent_trades() -> usize {
    1
}

fn default_runs() -> usize {
    DEFAULT_RUNS
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: 1000.0,
            win_rate: 0.10,
            risk_to_reward: 15.0,
            sizing: Sizing::FixedAmount(10.0),
            num_trades: 800,
            concurrent_trades: 20,
            num_runs: DEFAULT_RUNS,
            seed: None,
        }
    }
}

impl SimulationConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every parameter range. NaN and infinities fail every check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.initial_capital > 0.0 && self.initial_capital.is_finite()) {
            return Err(ConfigError::NonPositiveCapital(self.initial_capital));
        }
        if !(0.0..=1.0).contains(&self.win_rate) {
            return Err(ConfigError::WinRateOutOfRange(self.win_rate));
        }
        if !(self.risk_to_reward > 0.0 && self.risk_to_reward.is_finite()) {
            return Err(ConfigError::NonPositiveRiskToReward(self.risk_to_reward));
        }
        if !(self.sizing.value() > 0.0 && self.sizing.value().is_finite()) {
            return Err(ConfigError::NonPositiveSizing {
                mode: self.sizing.mode_name(),
                value: self.sizing.value(),
            });
        }
        if self.num_trades == 0 {
            return Err(ConfigError::ZeroTrades);
        }
        if self.num_runs == 0 {
            return Err(ConfigError::ZeroRuns);
        }
        if self.concurrent_trades == 0 {
            return Err(ConfigError::ZeroConcurrentTrades);
        }
        Ok(())
    }
}
