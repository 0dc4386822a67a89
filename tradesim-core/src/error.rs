//! Error taxonomy for the simulation engine.

use std::path::PathBuf;

use thiserror::Error;

/// A parameter of `SimulationConfig` is outside its valid range, or the
/// config could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("initial capital must be a positive finite amount, got {0}")]
    NonPositiveCapital(f64),
    #[error("win rate must lie in [0, 1], got {0}")]
    WinRateOutOfRange(f64),
    #[error("risk-to-reward ratio must be positive and finite, got {0}")]
    NonPositiveRiskToReward(f64),
    #[error("{mode} sizing value must be positive and finite, got {value}")]
    NonPositiveSizing { mode: &'static str, value: f64 },
    #[error("trade count must be at least 1")]
    ZeroTrades,
    #[error("run count must be at least 1")]
    ZeroRuns,
    #[error("concurrent trade count must be at least 1")]
    ZeroConcurrentTrades,
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by the trial engine and the run aggregator.
#[derive(Debug, Error)]
pub enum SimError {
    /// Rejected before any simulation runs; no partial results exist.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    /// A bounded draw stream ran dry mid-trial.
    #[error("random source exhausted after {drawn} draws")]
    RandomSourceExhausted { drawn: usize },
    #[error("aggregation cancelled after {completed} completed runs")]
    Cancelled { completed: usize },
}
