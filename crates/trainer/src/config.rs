//! Trainer Configuration

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use feature_engine::EncoderOptions;
use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `CARPRICE_TRAIN_SEED=7`
pub const ENV_PREFIX: &str = "CARPRICE_TRAIN";

/// Training run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Listings CSV
    pub dataset_path: PathBuf,
    /// Where to write the model artifact (`.json` or `.bin`)
    pub output_path: PathBuf,
    /// Share of rows held out for evaluation
    pub test_fraction: f64,
    /// Shuffle seed for the split
    pub seed: u64,
    /// Year ages are derived against; `None` means the current year
    pub reference_year: Option<i32>,
    /// Skip rows with blank required fields instead of failing
    pub drop_incomplete: bool,
    /// Vocabulary options
    pub encoder: EncoderOptions,
    /// Log level for the trainer binary
    pub log_level: String,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("dataset/car_data.csv"),
            output_path: PathBuf::from("models/car_price_model.json"),
            test_fraction: 0.2,
            seed: 42,
            reference_year: None,
            drop_incomplete: true,
            encoder: EncoderOptions::default(),
            log_level: "info".to_string(),
        }
    }
}

impl TrainerConfig {
    /// Defaults, overlaid by an optional TOML file, overlaid by `CARPRICE_TRAIN_*` variables
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&TrainerConfig::default())?);
        if let Some(path) = file {
            builder = builder.add_source(File::from(path));
        }
        builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
