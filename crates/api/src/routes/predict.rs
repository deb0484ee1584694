//! Prediction Routes

use axum::{extract::State, Json};
use data_validator::PriceRequest;
use inference_engine::AdjustmentFactor;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{ApiError, AppState};

/// Response for the predict endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictResponse {
    pub base_price: f64,
    pub adjustment_factor: f64,
    pub final_price: f64,
    pub currency: String,
}

/// Estimate the resale price of one car
pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PriceRequest>,
) -> Result<Json<PredictResponse>, ApiError> {
    let start = std::time::Instant::now();
    let result = run_prediction(&state, &request);

    match &result {
        Ok(response) => {
            state.predictions_served.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("car_price_predictions_total").increment(1);
            metrics::histogram!("car_price_prediction_seconds").record(start.elapsed().as_secs_f64());
            info!(
                "Predicted {} {} ({}): {:.2} {}",
                request.brand, request.model_year, request.transmission, response.final_price, response.currency
            );
        }
        Err(e) => {
            state.predictions_failed.fetch_add(1, Ordering::Relaxed);
            metrics::counter!("car_price_prediction_errors_total").increment(1);
            warn!("Prediction request rejected: {}", e);
        }
    }

    result.map(Json)
}

fn run_prediction(state: &AppState, request: &PriceRequest) -> Result<PredictResponse, ApiError> {
    let record = state.validator.to_record(request)?;
    let adjustment = AdjustmentFactor::from_condition_score(request.condition_score.unwrap_or(0.0));
    let result = state.predictor.predict(&record, adjustment)?;

    if result.base_price <= 0.0 {
        return Err(ApiError::NonPositivePrice(result.base_price));
    }

    Ok(PredictResponse {
        base_price: result.base_price,
        adjustment_factor: result.adjustment_factor,
        final_price: result.final_price,
        currency: state.currency.clone(),
    })
}
