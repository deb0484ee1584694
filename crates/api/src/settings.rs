//! Service Configuration

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use data_validator::ValidationConfig;
use inference_engine::AlignPolicy;
use serde::{Deserialize, Serialize};

/// Environment variable prefix, e.g. `CARPRICE_BIND_ADDR=127.0.0.1:9000`;
/// nested keys use `__`, e.g. `CARPRICE_VALIDATION__MIN_MODEL_YEAR=2000`
pub const ENV_PREFIX: &str = "CARPRICE";

/// Prediction service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Listen address
    pub bind_addr: String,
    /// Model artifact written by the trainer
    pub model_path: PathBuf,
    /// How request columns unknown to the model are handled
    pub align_policy: AlignPolicy,
    /// Currency code reported with prices
    pub currency: String,
    /// Log level
    pub log_level: String,
    /// Request field ranges and brand catalogue
    pub validation: ValidationConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            model_path: PathBuf::from("models/car_price_model.json"),
            align_policy: AlignPolicy::Lenient,
            currency: "INR".to_string(),
            log_level: "info".to_string(),
            validation: ValidationConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Defaults, overlaid by an optional TOML file, overlaid by `CARPRICE_*` variables
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&ServiceConfig::default())?);
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
