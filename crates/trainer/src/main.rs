//! Car Price Model Trainer - Entry Point

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use trainer::{init_logging, TrainerConfig};

#[derive(Parser)]
#[command(name = "train-price-model")]
#[command(about = "Fit the used-car price model from historical listings")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listings CSV (overrides config)
    #[arg(short, long)]
    dataset: Option<PathBuf>,

    /// Output artifact path, `.json` or `.bin` (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Split seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Holdout fraction (overrides config)
    #[arg(long)]
    test_fraction: Option<f64>,

    /// Year ages are derived against (overrides config)
    #[arg(long)]
    reference_year: Option<i32>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = TrainerConfig::load(cli.config.as_deref()).context("failed to load trainer configuration")?;
    if let Some(dataset) = cli.dataset {
        config.dataset_path = dataset;
    }
    if let Some(output) = cli.output {
        config.output_path = output;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    if let Some(fraction) = cli.test_fraction {
        config.test_fraction = fraction;
    }
    if cli.reference_year.is_some() {
        config.reference_year = cli.reference_year;
    }

    init_logging(&config.log_level);
    info!("=== Car Price Trainer v{} ===", env!("CARGO_PKG_VERSION"));

    let report = trainer::run(&config)
        .with_context(|| format!("training from {} failed", config.dataset_path.display()))?;

    info!(
        "Model trained on {} rows ({} held out, {} skipped) and saved to {}",
        report.train_rows,
        report.test_rows,
        report.skipped_rows,
        config.output_path.display()
    );
    Ok(())
}
