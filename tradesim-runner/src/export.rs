//! Export: CSV tables and a JSON manifest for downstream charting.
//!
//! Produces plain data only. Spreadsheet layout, colours and chart images are
//! left to whatever tool reads these files. Balance tables keep full `f64`
//! precision; only the summary table is rounded to cents.
//!
//! The JSON manifest carries a `schema_version` field. Unknown versions are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use tradesim_core::{OutcomeSequence, SimulationConfig, Trajectory};

use crate::aggregate::AggregateResult;
use crate::report::SimulationReport;
use crate::stats::percentile_trajectory;

/// Current schema version for persisted manifests.
pub const SCHEMA_VERSION: u32 = 1;

/// JSON manifest: the report plus the highlighted paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub report: SimulationReport,
    pub best: Trajectory,
    pub worst: Trajectory,
    pub most_likely: Trajectory,
    pub best_outcomes: OutcomeSequence,
    pub worst_outcomes: OutcomeSequence,
    /// Outcomes of the representative run; illustrative for `most_likely`.
    pub representative_outcomes: OutcomeSequence,
}

fn default_schema_version() -> u32 {
    1
}

impl ReportManifest {
    pub fn new(report: SimulationReport, result: &AggregateResult) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: Utc::now(),
            report,
            best: result.best.trajectory.clone(),
            worst: result.worst.trajectory.clone(),
            most_likely: result.median.clone(),
            best_outcomes: result.best.outcomes.clone(),
            worst_outcomes: result.worst.outcomes.clone(),
            representative_outcomes: result.representative.clone(),
        }
    }
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a manifest to pretty JSON.
pub fn export_json(manifest: &ReportManifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize ReportManifest to JSON")
}

/// Deserialize a manifest from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ReportManifest> {
    let manifest: ReportManifest =
        serde_json::from_str(json).context("failed to deserialize ReportManifest from JSON")?;
    if manifest.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            manifest.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(manifest)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// One row per run, one column per trade.
///
/// Columns: run, trade_1, trade_2, ..., trade_N
pub fn export_all_simulations_csv(result: &AggregateResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    let steps = result.median.len();

    let mut header = Vec::with_capacity(steps + 1);
    header.push("run".to_string());
    header.extend((1..=steps).map(|i| format!("trade_{i}")));
    wtr.write_record(&header)?;

    for (run, trajectory) in result.all_trajectories.iter().enumerate() {
        let mut row = Vec::with_capacity(trajectory.len() + 1);
        row.push(run.to_string());
        row.extend(trajectory.iter().map(f64::to_string));
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Best, worst and most likely balances side by side, with the 5th and 95th
/// percentile band across all runs.
///
/// Columns: trade, best, worst, most_likely, p5, p95
pub fn export_scenarios_csv(result: &AggregateResult) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trade", "best", "worst", "most_likely", "p5", "p95"])?;

    let p5 = percentile_trajectory(&result.all_trajectories, 5.0);
    let p95 = percentile_trajectory(&result.all_trajectories, 95.0);
    let rows = result
        .best
        .trajectory
        .iter()
        .zip(&result.worst.trajectory)
        .zip(&result.median)
        .zip(p5.iter().zip(&p95))
        .enumerate();
    for (i, (((best, worst), likely), (low, high))) in rows {
        wtr.write_record([
            (i + 1).to_string(),
            best.to_string(),
            worst.to_string(),
            likely.to_string(),
            low.to_string(),
            high.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// The summary table, one row per scenario.
pub fn export_summary_csv(report: &SimulationReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "scenario",
        "start_balance",
        "end_balance",
        "return_pct",
        "max_drawdown_pct",
        "max_drawdown_abs",
        "max_consecutive_losses",
        "max_consecutive_wins",
        "streaks_illustrative",
    ])?;

    for s in &report.scenarios {
        wtr.write_record([
            s.scenario.label().to_string(),
            format!("{:.2}", s.start_balance),
            format!("{:.2}", s.end_balance),
            format!("{:.2}", s.return_pct),
            format!("{:.2}", s.max_drawdown_pct),
            format!("{:.2}", s.max_drawdown_abs),
            s.max_consecutive_losses.to_string(),
            s.max_consecutive_wins.to_string(),
            s.streaks_illustrative.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Directory name for a config's artifacts, keyed by win rate and
/// risk-to-reward.
pub fn artifact_dir_name(config: &SimulationConfig) -> String {
    format!(
        "Monte_Carlo_Simulation_WR_{}_RR_{}",
        config.win_rate, config.risk_to_reward
    )
}

/// Save the full artifact set for one aggregation.
///
/// Creates `Monte_Carlo_Simulation_WR_{win_rate}_RR_{rr}/` under
/// `output_dir` containing:
/// - `all_simulations.csv`: every run's trajectory
/// - `scenarios.csv`: best / worst / most likely balances and the p5/p95 band
/// - `summary.csv`: the scenario summary table
/// - `report.json`: the `ReportManifest`
///
/// Existing files in that directory are overwritten. Returns the directory.
pub fn save_artifacts(
    config: &SimulationConfig,
    result: &AggregateResult,
    output_dir: &Path,
) -> Result<PathBuf> {
    let run_dir = output_dir.join(artifact_dir_name(config));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let report = SimulationReport::from_result(config, result);

    write(&run_dir, "all_simulations.csv", &export_all_simulations_csv(result)?)?;
    write(&run_dir, "scenarios.csv", &export_scenarios_csv(result)?)?;
    write(&run_dir, "summary.csv", &export_summary_csv(&report)?)?;
    let manifest = ReportManifest::new(report, result);
    write(&run_dir, "report.json", &export_json(&manifest)?)?;

    info!(dir = %run_dir.display(), runs = result.run_count(), "saved artifacts");
    Ok(run_dir)
}

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))
}
