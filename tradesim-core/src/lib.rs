//! TradeSim Core: simulation config, RNG hierarchy, trial engine, streaks.
//!
//! This crate contains the single-path part of the Monte Carlo engine:
//! - `SimulationConfig` with range validation and TOML loading
//! - Deterministic per-run RNG streams derived from a master seed
//! - Trial engine: one path of sequential fixed-edge trades
//! - Streak analyzer: longest win and loss runs of an outcome sequence
//!
//! Multi-run aggregation lives in `tradesim-runner`.

pub mod config;
pub mod error;
pub mod rng;
pub mod streak;
pub mod trial;

pub use config::{SimulationConfig, Sizing, DEFAULT_RUNS};
pub use error::{ConfigError, SimError};
pub use rng::{RngHierarchy, REPRESENTATIVE_STREAM, RUN_STREAM};
pub use streak::{analyze, StreakSummary};
pub use trial::{
    apply_trade, replay, simulate, OutcomeSequence, RunResult, ScriptedDraws, Trajectory,
    UniformSource,
};
