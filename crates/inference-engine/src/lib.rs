//! Price Inference Engine
//!
//! Serving-time pipeline: encode a request with the model's vocabulary, align
//! it to the model's feature schema, predict, and apply the condition
//! adjustment.

mod aligner;
mod predictor;

pub use aligner::{align, align_with, AlignPolicy, Alignment};
pub use predictor::{
    predict_price, predict_price_with, AdjustmentFactor, PredictionResult, PricePredictor,
};

use feature_engine::SchemaError;
use price_model::ModelError;
use thiserror::Error;

/// Errors during alignment
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignError {
    #[error("Request carries columns unknown to the model: {0:?}")]
    UnexpectedColumns(Vec<String>),
}

/// Errors during a prediction request
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("Encoding failed: {0}")]
    Encode(#[from] SchemaError),
    #[error("Alignment failed: {0}")]
    Align(#[from] AlignError),
    #[error("Model failed: {0}")]
    Model(#[from] ModelError),
    #[error("Adjustment factor {0} outside [1.0, 1.1]")]
    InvalidAdjustment(f64),
}
