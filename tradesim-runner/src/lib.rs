//! TradeSim Runner: Monte Carlo aggregation, scenario summaries, export.
//!
//! This crate builds on `tradesim-core` to provide:
//! - Parallel, seed-reproducible aggregation of many independent trials
//! - Best / worst / per-index median trajectories
//! - Scenario summary metrics (return, drawdown, streaks)
//! - CSV and JSON artifacts for external charting tools

pub mod aggregate;
pub mod export;
pub mod report;
pub mod stats;

pub use aggregate::{aggregate, AggregateResult, Aggregator};
pub use export::{
    artifact_dir_name, export_all_simulations_csv, export_json, export_scenarios_csv,
    export_summary_csv, import_json, save_artifacts, ReportManifest, SCHEMA_VERSION,
};
pub use report::{FinalBalanceStats, Scenario, ScenarioSummary, SimulationReport};
pub use stats::{median, median_trajectory, percentile_sorted, percentile_trajectory};
