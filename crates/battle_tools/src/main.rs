//! Battle engine development tools.
//!
//! # Usage
//!
//! ```bash
//! # Resolve one scenario and print its report as JSON
//! cargo run -p battle_tools -- simulate --scenario data/pass_ambush.ron --seed 42
//!
//! # Run a scenario under 1000 seeds in parallel
//! cargo run -p battle_tools -- batch --scenario data/pass_ambush.ron --count 1000
//!
//! # Validator verdict and win-rate estimate for two powers
//! cargo run -p battle_tools -- estimate --attacker 100 --defender 2000
//!
//! # Check every RON file in a directory
//! cargo run -p battle_tools -- validate data/
//! ```
//!
//! Reports go to stdout; logs go to stderr (`RUST_LOG` overrides the level).

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use battle_core::report::BattleEngine;
use battle_tools::batch::{run_batch, BatchConfig};
use battle_tools::estimate::estimate;
use battle_tools::scenario::{load_config, load_scenario, run_scenario, RunOptions};
use battle_tools::validate::validate_data_directory;
use battle_tools::ToolError;

#[derive(Parser)]
#[command(name = "battle-tools")]
#[command(about = "Development tools for the battle engine")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Battle config RON file (defaults to the built-in balance)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a single scenario and print the report
    Simulate {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Seed override
        #[arg(long)]
        seed: Option<u64>,

        /// Resolve even if the validator rejects the battle
        #[arg(long)]
        force: bool,

        /// Pretty-print the JSON report
        #[arg(long)]
        pretty: bool,
    },

    /// Run a scenario under many seeds for balance testing
    Batch {
        /// Scenario file to load
        #[arg(short, long)]
        scenario: PathBuf,

        /// Number of battles to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Starting random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum parallel battles (0 = auto)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Write results JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validator verdict and win-rate estimate for two side powers
    Estimate {
        /// Attacker power
        #[arg(short, long)]
        attacker: u32,

        /// Defender power
        #[arg(short, long)]
        defender: u32,

        /// Attacker level minus defender level
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        level_diff: i32,
    },

    /// Validate data files
    Validate {
        /// Path to data directory
        #[arg(default_value = "data")]
        path: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    // Logs to stderr; stdout carries reports
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Simulate {
            scenario,
            seed,
            force,
            pretty,
        } => cmd_simulate(&scenario, cli.config.as_deref(), RunOptions { seed, force }, pretty),
        Commands::Batch {
            scenario,
            count,
            seed,
            parallel,
            output,
        } => {
            let batch = BatchConfig {
                battle_count: count,
                seed_start: seed,
                parallel,
            };
            cmd_batch(&scenario, cli.config.as_deref(), &batch, output.as_deref())
        }
        Commands::Estimate {
            attacker,
            defender,
            level_diff,
        } => print_json(&estimate(attacker, defender, level_diff), true),
        Commands::Validate { path } => cmd_validate(&path),
    };

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

fn cmd_simulate(
    scenario_path: &Path,
    config_path: Option<&Path>,
    options: RunOptions,
    pretty: bool,
) -> Result<(), ToolError> {
    let config = load_config(config_path)?;
    let scenario = load_scenario(scenario_path)?;
    let report = run_scenario(&scenario, &config, options)?;
    print_json(&report, pretty)
}

fn cmd_batch(
    scenario_path: &Path,
    config_path: Option<&Path>,
    batch: &BatchConfig,
    output: Option<&Path>,
) -> Result<(), ToolError> {
    let base = load_config(config_path)?;
    let scenario = load_scenario(scenario_path)?;
    let config = scenario.effective_config(&base);
    let request = scenario.to_request(&config)?;
    let engine = BattleEngine::new(config)?;

    tracing::info!(
        "Running {} battles of {} from seed {}",
        batch.battle_count,
        scenario_path.display(),
        batch.seed_start
    );
    let results = run_batch(&engine, &request, batch);

    match output {
        Some(path) => {
            results.save(path)?;
            tracing::info!("Results saved to {}", path.display());
            Ok(())
        }
        None => print_json(&results, true),
    }
}

fn cmd_validate(path: &Path) -> Result<(), ToolError> {
    tracing::info!("Validating data files in: {}", path.display());
    let report = validate_data_directory(path)?;

    for (file, message) in &report.failed {
        tracing::error!("{}: {message}", file.display());
    }
    if report.is_ok() {
        tracing::info!("Validation passed ({} files)", report.files_checked());
        Ok(())
    } else {
        Err(ToolError::ValidationFailed {
            failed: report.failed.len(),
            total: report.files_checked(),
        })
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), ToolError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}
