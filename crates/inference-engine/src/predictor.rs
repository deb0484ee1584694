//! Price Prediction Pipeline

use std::sync::Arc;

use feature_engine::{CarRecord, EncodeMode, FeatureEncoder};
use price_model::{FittedModel, PriceModel};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aligner::{align_with, AlignPolicy};
use crate::PredictionError;

/// Multiplier applied on top of the model's price, bounded to [1.0, 1.1]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct AdjustmentFactor(f64);

impl AdjustmentFactor {
    pub const MIN: f64 = 1.0;
    pub const MAX: f64 = 1.1;

    /// No adjustment
    pub const NONE: AdjustmentFactor = AdjustmentFactor(1.0);

    /// Validate an explicit factor
    pub fn new(factor: f64) -> Result<Self, PredictionError> {
        if factor.is_finite() && (Self::MIN..=Self::MAX).contains(&factor) {
            Ok(Self(factor))
        } else {
            Err(PredictionError::InvalidAdjustment(factor))
        }
    }

    /// Map a visual condition score in [0, 1] to `1 + 0.1 · score`.
    ///
    /// Out-of-range scores are clamped; NaN counts as 0.
    pub fn from_condition_score(score: f64) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 1.0) };
        Self(1.0 + 0.1 * score)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for AdjustmentFactor {
    fn default() -> Self {
        Self::NONE
    }
}

/// Outcome of one prediction request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Raw model output
    pub base_price: f64,
    /// Multiplier that was applied
    pub adjustment_factor: f64,
    /// `base_price × adjustment_factor`
    pub final_price: f64,
}

/// Encode, align, predict and adjust a single car.
///
/// The model is passed in explicitly; nothing here keeps global state.
pub fn predict_price(
    raw_input: &CarRecord,
    model: &FittedModel,
    adjustment: AdjustmentFactor,
) -> Result<PredictionResult, PredictionError> {
    predict_price_with(raw_input, model, adjustment, AlignPolicy::Lenient)
}

/// [`predict_price`] under an explicit alignment policy
pub fn predict_price_with(
    raw_input: &CarRecord,
    model: &FittedModel,
    adjustment: AdjustmentFactor,
    policy: AlignPolicy,
) -> Result<PredictionResult, PredictionError> {
    let encoder = FeatureEncoder::from_vocabulary(model.vocabulary().clone());
    let encoded = encoder.encode_one(raw_input, EncodeMode::Infer)?;

    let alignment = align_with(&encoded, model.schema(), policy)?;
    let base_price = PriceModel::predict(model, &alignment.vector)?;
    let final_price = base_price * adjustment.value();

    debug!(
        "Predicted {} (age={}, mileage={}): base={:.2}, factor={:.3}",
        raw_input.brand, raw_input.age, raw_input.mileage, base_price, adjustment.value()
    );

    Ok(PredictionResult {
        base_price,
        adjustment_factor: adjustment.value(),
        final_price,
    })
}

/// Prediction front end holding a shared, read-only model
#[derive(Debug, Clone)]
pub struct PricePredictor {
    model: Arc<FittedModel>,
    policy: AlignPolicy,
}

impl PricePredictor {
    /// Create a predictor around a loaded model
    pub fn new(model: Arc<FittedModel>, policy: AlignPolicy) -> Self {
        Self { model, policy }
    }

    /// Predict one car
    pub fn predict(
        &self,
        raw_input: &CarRecord,
        adjustment: AdjustmentFactor,
    ) -> Result<PredictionResult, PredictionError> {
        predict_price_with(raw_input, &self.model, adjustment, self.policy)
    }

    pub fn model(&self) -> &FittedModel {
        &self.model
    }

    pub fn policy(&self) -> AlignPolicy {
        self.policy
    }
}
