//! Model and Catalogue Routes

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use feature_engine::TRANSMISSIONS;
use inference_engine::AlignPolicy;
use price_model::EvaluationMetrics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::AppState;

/// Description of the loaded model
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfoResponse {
    pub schema_version: u32,
    pub columns: Vec<String>,
    pub intercept: f64,
    pub n_samples: usize,
    pub trained_at: DateTime<Utc>,
    pub evaluation: Option<EvaluationMetrics>,
    pub align_policy: AlignPolicy,
}

/// Form choices accepted by the predict endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub brands: Vec<String>,
    pub transmissions: Vec<String>,
    pub engine_size_range: (f64, f64),
    pub mileage_range: (f64, f64),
    pub min_model_year: i32,
}

/// Get the loaded model's schema and provenance
pub async fn get_model(State(state): State<Arc<AppState>>) -> Json<ModelInfoResponse> {
    let model = state.predictor.model();
    let metadata = model.metadata();

    Json(ModelInfoResponse {
        schema_version: model.schema().version(),
        columns: model.schema().columns().to_vec(),
        intercept: model.intercept(),
        n_samples: metadata.n_samples,
        trained_at: metadata.trained_at,
        evaluation: metadata.evaluation,
        align_policy: state.predictor.policy(),
    })
}

/// Get the accepted brands and field ranges
pub async fn get_catalog(State(state): State<Arc<AppState>>) -> Json<CatalogResponse> {
    let config = state.validator.config();

    Json(CatalogResponse {
        brands: config.brands.clone(),
        transmissions: TRANSMISSIONS.iter().map(|t| t.to_string()).collect(),
        engine_size_range: config.engine_size_range,
        mileage_range: config.mileage_range,
        min_model_year: config.min_model_year,
    })
}
