//! Hold-out Regression CLI
//!
//! ```bash
//! cargo run -- demo --seed 7
//! cargo run -- demo --split-date 2012-10-01 --disjoint
//! cargo run -- init-config holdout.toml
//! ```

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use holdout_regression::data::synthetic::{generate_daily_rentals, SyntheticConfig};
use holdout_regression::logging::setup_logging;
use holdout_regression::models::RankDeficiency;
use holdout_regression::{Config, Evaluator, SplitRule};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "holdout-regression")]
#[command(about = "Chronological hold-out evaluation of a linear regression model")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate on a synthetic daily rentals dataset
    Demo {
        /// Split date (YYYY-MM-DD)
        #[arg(short, long)]
        split_date: Option<NaiveDate>,

        /// Target column
        #[arg(short, long)]
        target: Option<String>,

        /// Exclude rows at the split date from training
        #[arg(long)]
        disjoint: bool,

        /// Take the minimum-norm fit when training features are collinear
        #[arg(long)]
        min_norm: bool,

        /// Random seed for the synthetic data
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Number of days to generate from 2011-01-01
        #[arg(long, default_value = "731")]
        days: usize,
    },

    /// Write the default configuration to a file
    InitConfig {
        /// Output path
        #[arg(default_value = "holdout.toml")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    setup_logging(&config.logging.level)?;

    match cli.command {
        Commands::Demo {
            split_date,
            target,
            disjoint,
            min_norm,
            seed,
            days,
        } => {
            let mut eval_config = config.evaluation;
            if let Some(date) = split_date {
                eval_config.split_date = date;
            }
            if let Some(target) = target {
                eval_config.target_field = target;
            }
            if disjoint {
                eval_config.split_rule = SplitRule::Disjoint;
            }
            if min_norm {
                eval_config.rank_deficiency = RankDeficiency::MinimumNorm;
            }

            let synthetic = SyntheticConfig {
                days,
                seed,
                ..Default::default()
            };
            info!(days, seed, "generating synthetic daily rentals");
            let frame = generate_daily_rentals(&synthetic)?;

            let report = Evaluator::new(eval_config).evaluate_report(&frame)?;
            println!("{}", report.summary());
        }

        Commands::InitConfig { output } => {
            Config::create_default(&output)?;
            info!("Wrote default configuration to {:?}", output);
        }
    }

    Ok(())
}
