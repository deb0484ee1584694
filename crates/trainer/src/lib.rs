//! Offline Price Model Trainer
//!
//! Reads historical listings, learns the feature vocabulary, fits the
//! least-squares model on a seeded training split, evaluates it on the
//! holdout and writes the model artifact.

pub mod config;
pub mod dataset;
pub mod split;

use feature_engine::{current_year, CarRecord, FeatureEncoder, SchemaError};
use inference_engine::{predict_price, AdjustmentFactor, PredictionError};
use price_model::{ArtifactError, EvaluationMetrics, FittedModel, ModelError, PriceModel};
use thiserror::Error;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub use crate::config::TrainerConfig;
pub use crate::dataset::{load_csv, Dataset, ListingRow};
pub use crate::split::{train_test_split, Split};

/// Errors during a training run
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Dataset is missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("Line {row}: missing {field}")]
    MissingValue { row: usize, field: &'static str },
    #[error("Line {row}: invalid {field} value {value}")]
    InvalidValue {
        row: usize,
        field: &'static str,
        value: f64,
    },
    #[error("Dataset has no usable rows")]
    EmptyDataset,
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Outcome of a training run
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub model: FittedModel,
    pub train_rows: usize,
    pub test_rows: usize,
    pub skipped_rows: usize,
}

/// Fit a model on `dataset` using the configured split and encoder options
pub fn train(dataset: &Dataset, config: &TrainerConfig, reference_year: i32) -> Result<TrainReport, TrainError> {
    let split = train_test_split(dataset.len(), config.test_fraction, config.seed);
    let train_set = dataset.select(&split.train);
    let test_set = dataset.select(&split.test);

    let encoder = FeatureEncoder::fit(&train_set.records, config.encoder)?;
    let matrix = encoder.encode_matrix(&train_set.records)?;
    let model = PriceModel::fit(&matrix, &train_set.prices, encoder.vocabulary().clone())?;

    let evaluation = evaluate(&model, &test_set);
    match &evaluation {
        Some(m) => info!(
            "Holdout ({} rows): R²={:.4}, MAE={:.2}, RMSE={:.2}",
            m.n_samples, m.r_squared, m.mae, m.rmse
        ),
        None => warn!("No holdout rows; skipping evaluation"),
    }

    Ok(TrainReport {
        model: model.with_metadata(Some(reference_year), evaluation),
        train_rows: train_set.len(),
        test_rows: test_set.len(),
        skipped_rows: dataset.skipped,
    })
}

/// Score a fitted model on labelled rows through the serving path.
///
/// Serving requests carry no horsepower, so it is stripped before predicting.
pub fn evaluate(model: &FittedModel, holdout: &Dataset) -> Option<EvaluationMetrics> {
    let mut predictions = Vec::with_capacity(holdout.len());
    let mut targets = Vec::with_capacity(holdout.len());

    for (record, price) in holdout.records.iter().zip(&holdout.prices) {
        let request = CarRecord {
            horsepower: None,
            ..record.clone()
        };
        match predict_price(&request, model, AdjustmentFactor::NONE) {
            Ok(result) => {
                predictions.push(result.base_price);
                targets.push(*price);
            }
            Err(PredictionError::Encode(e)) => warn!("Holdout row not encodable: {}", e),
            Err(e) => warn!("Holdout prediction failed: {}", e),
        }
    }

    EvaluationMetrics::compute(&predictions, &targets)
}

/// Parse a configured log level, falling back to INFO
pub fn log_level(level: &str) -> Level {
    level.parse().unwrap_or(Level::INFO)
}

/// Initialize logging for the trainer binary
pub fn init_logging(level: &str) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level(level))
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("Tracing subscriber already set");
    }
}

/// Full run: load CSV, train, persist the artifact
pub fn run(config: &TrainerConfig) -> Result<TrainReport, TrainError> {
    let reference_year = config.reference_year.unwrap_or_else(current_year);
    info!(
        "Training from {} (reference year {}, seed {})",
        config.dataset_path.display(),
        reference_year,
        config.seed
    );

    let dataset = load_csv(&config.dataset_path, reference_year, config.drop_incomplete)?;
    let report = train(&dataset, config, reference_year)?;
    price_model::artifact::save(&report.model, &config.output_path)?;

    Ok(report)
}
