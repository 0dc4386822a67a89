//! TradeSim CLI: Monte Carlo runs of a fixed-edge trading plan.
//!
//! Commands:
//! - `run`: aggregate many simulated trade sequences, print the scenario
//!   summary and write CSV/JSON artifacts
//! - `init-config`: write the default configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tradesim_core::{SimulationConfig, Sizing};
use tradesim_runner::{save_artifacts, AggregateResult, Aggregator, SimulationReport};

#[derive(Parser)]
#[command(
    name = "tradesim",
    about = "TradeSim CLI — Monte Carlo simulator for fixed-edge trading"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation and print best / worst / most likely outcomes.
    Run {
        /// Path to a TOML config file. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Starting balance.
        #[arg(long)]
        initial_capital: Option<f64>,

        /// Probability that a trade wins, in [0, 1].
        #[arg(long)]
        win_rate: Option<f64>,

        /// Reward multiple of the risked amount on a win.
        #[arg(long)]
        risk_to_reward: Option<f64>,

        /// Risk this currency amount per trade.
        #[arg(long)]
        fixed_amount: Option<f64>,

        /// Risk this percent of the current balance per trade, split across
        /// concurrent trades.
        #[arg(long)]
        percent_balance: Option<f64>,

        /// Trades per run.
        #[arg(long)]
        trades: Option<usize>,

        /// Number of simultaneously open trades.
        #[arg(long)]
        concurrent_trades: Option<usize>,

        /// Number of independent runs.
        #[arg(long)]
        runs: Option<usize>,

        /// Master seed. Omit to draw one from entropy.
        #[arg(long)]
        seed: Option<u64>,

        /// Run on a single thread.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the summary only; write no files.
        #[arg(long, default_value_t = false)]
        no_export: bool,
    },
    /// Write the default configuration as TOML.
    InitConfig {
        /// Destination file.
        #[arg(default_value = "tradesim.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

/// Flag values that override the loaded config.
struct Overrides {
    initial_capital: Option<f64>,
    win_rate: Option<f64>,
    risk_to_reward: Option<f64>,
    fixed_amount: Option<f64>,
    percent_balance: Option<f64>,
    trades: Option<usize>,
    concurrent_trades: Option<usize>,
    runs: Option<usize>,
    seed: Option<u64>,
}

impl Overrides {
    fn apply(self, mut config: SimulationConfig) -> Result<SimulationConfig> {
        config.sizing = match (self.fixed_amount, self.percent_balance) {
            (Some(_), Some(_)) => bail!("--fixed-amount and --percent-balance are mutually exclusive"),
            (Some(amount), None) => Sizing::FixedAmount(amount),
            (None, Some(percent)) => Sizing::PercentOfBalance(percent),
            (None, None) => config.sizing,
        };
        if let Some(v) = self.initial_capital {
            config.initial_capital = v;
        }
        if let Some(v) = self.win_rate {
            config.win_rate = v;
        }
        if let Some(v) = self.risk_to_reward {
            config.risk_to_reward = v;
        }
        if let Some(v) = self.trades {
            config.num_trades = v;
        }
        if let Some(v) = self.concurrent_trades {
            config.concurrent_trades = v;
        }
        if let Some(v) = self.runs {
            config.num_runs = v;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tradesim=info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            initial_capital,
            win_rate,
            risk_to_reward,
            fixed_amount,
            percent_balance,
            trades,
            concurrent_trades,
            runs,
            seed,
            sequential,
            output_dir,
            no_export,
        } => {
            let overrides = Overrides {
                initial_capital,
                win_rate,
                risk_to_reward,
                fixed_amount,
                percent_balance,
                trades,
                concurrent_trades,
                runs,
                seed,
            };
            run_simulation_cmd(
                config.as_deref(),
                overrides,
                sequential,
                (!no_export).then_some(output_dir.as_path()),
            )
        }
        Commands::InitConfig { path, force } => run_init_config(&path, force),
    }
}

fn run_simulation_cmd(
    config_path: Option<&Path>,
    overrides: Overrides,
    sequential: bool,
    output_dir: Option<&Path>,
) -> Result<()> {
    let base = match config_path {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    let config = overrides.apply(base)?;
    config.validate().context("invalid simulation parameters")?;

    let total = config.num_runs;
    let step = (total / 10).max(1);
    let result = Aggregator::new(config.clone())
        .with_parallelism(!sequential)
        .run_with_progress(|done, total| {
            if done % step == 0 || done == total {
                info!(done, total, "runs completed");
            }
        })
        .context("simulation failed")?;

    let report = SimulationReport::from_result(&config, &result);
    print_summary(&report, &result);

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&config, &result, dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn print_summary(report: &SimulationReport, result: &AggregateResult) {
    let c = &report.config;
    println!("=== Monte Carlo Simulation ===");
    println!(
        "Win rate: {:.1}%  R:R: {}  Sizing: {} {}  Trades: {}  Concurrent: {}",
        c.win_rate * 100.0,
        c.risk_to_reward,
        c.sizing.mode_name(),
        c.sizing.value(),
        c.num_trades,
        c.concurrent_trades,
    );
    println!("Runs: {}  Master seed: {}", report.runs, report.master_seed);
    println!();
    println!(
        "{:<12} {:>12} {:>12} {:>10} {:>10} {:>12} {:>10} {:>10}",
        "Scenario", "Start", "End", "Return%", "MaxDD%", "MaxDD", "MaxLoss", "MaxWin"
    );
    for s in &report.scenarios {
        let marker = if s.streaks_illustrative { "*" } else { "" };
        println!(
            "{:<12} {:>12.2} {:>12.2} {:>10.2} {:>10.2} {:>12.2} {:>10} {:>10}",
            s.scenario.label(),
            s.start_balance,
            s.end_balance,
            s.return_pct,
            s.max_drawdown_pct,
            s.max_drawdown_abs,
            format!("{}{marker}", s.max_consecutive_losses),
            format!("{}{marker}", s.max_consecutive_wins),
        );
    }
    println!("* streaks from one representative run; the median path has no outcomes of its own");
    println!();

    let f = &report.final_balances;
    println!(
        "Final balance  mean: {:.2}  p5: {:.2}  median: {:.2}  p95: {:.2}",
        f.mean, f.p5, f.median, f.p95
    );
    println!(
        "Ended below start: {:.1}%  Ended negative: {:.1}%",
        f.fraction_below_start * 100.0,
        f.fraction_negative * 100.0
    );
    println!(
        "Best run: #{}  Worst run: #{}",
        result.best_run_index, result.worst_run_index
    );
}

fn run_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        );
    }
    let toml_str = toml::to_string_pretty(&SimulationConfig::default())
        .context("failed to serialize default config")?;
    std::fs::write(path, toml_str)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}
