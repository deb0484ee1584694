//! Car Price Prediction API Server
//!
//! Loads a trained model artifact once at startup and serves price estimates
//! over HTTP. The model is shared read-only across handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use data_validator::{ValidationError, Validator};
use inference_engine::{PredictionError, PricePredictor};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use price_model::{ArtifactError, FittedModel};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

pub mod routes;
pub mod settings;

pub use settings::ServiceConfig;

/// Application state shared across handlers
pub struct AppState {
    /// Predictor over the loaded model
    pub predictor: PricePredictor,
    /// Request validator
    pub validator: Validator,
    /// Currency code reported with prices
    pub currency: String,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Successful predictions since start
    pub predictions_served: AtomicU64,
    /// Rejected predictions since start
    pub predictions_failed: AtomicU64,
    /// Prometheus render handle, when a recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state around a loaded model
    pub fn new(model: FittedModel, config: &ServiceConfig) -> Self {
        Self {
            predictor: PricePredictor::new(Arc::new(model), config.align_policy),
            validator: Validator::new(config.validation.clone()),
            currency: config.currency.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            predictions_served: AtomicU64::new(0),
            predictions_failed: AtomicU64::new(0),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for the `/metrics` route
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Per-request failures, reported to the caller without affecting the server
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),
    #[error("Prediction failed: {0}")]
    Prediction(#[from] PredictionError),
    #[error("Model produced a non-positive price ({0:.2}) for this car")]
    NonPositivePrice(f64),
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
    }
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model_columns: usize,
    pub predictions_served: u64,
    pub predictions_failed: u64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/predict", post(routes::predict::predict))
        .route("/api/v1/model", get(routes::catalog::get_model))
        .route("/api/v1/brands", get(routes::catalog::get_catalog))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model_columns: state.predictor.model().schema().len(),
        predictions_served: state.predictions_served.load(Ordering::Relaxed),
        predictions_failed: state.predictions_failed.load(Ordering::Relaxed),
    })
}

/// Prometheus exposition handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging
pub fn init_logging(level: &str) {
    let level = level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("Tracing subscriber already set");
    }
}

/// Load the model artifact. Any failure here must stop startup.
pub fn load_model(config: &ServiceConfig) -> Result<FittedModel, ArtifactError> {
    info!("Loading model artifact from {}", config.model_path.display());
    price_model::artifact::load(&config.model_path)
}

/// Run the server
pub async fn run_server(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    let model = load_model(&config)?;

    let mut state = AppState::new(model, &config);
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => state = state.with_metrics(handle),
        Err(e) => warn!("Prometheus recorder unavailable: {}", e),
    }

    let app = create_router(Arc::new(state));

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::catalog::{CatalogResponse, ModelInfoResponse};
    use crate::routes::predict::PredictResponse;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use feature_engine::{CarRecord, EncoderOptions, FeatureEncoder};
    use price_model::PriceModel;
    use tower::ServiceExt;

    const BRANDS: [&str; 4] = ["Maruti", "Hyundai", "Honda", "BMW"];

    fn model() -> FittedModel {
        let records: Vec<CarRecord> = (0..80)
            .map(|i| CarRecord {
                brand: BRANDS[i % BRANDS.len()].to_string(),
                age: (i % 15) as u32,
                mileage: 1_000 + ((i * 7_919) % 200_000) as u64,
                engine_size: 800 + ((i * 431) % 3_000) as u32,
                horsepower: Some(70.0 + ((i * 13) % 200) as f64),
                transmission: if (i / 4) % 2 == 0 { "Manual" } else { "Automatic" }.to_string(),
            })
            .collect();
        let prices: Vec<f64> = records
            .iter()
            .map(|r| 1_500_000.0 - 30_000.0 * r.age as f64 - 2.0 * r.mileage as f64)
            .collect();
        let encoder = FeatureEncoder::fit(&records, EncoderOptions::default()).unwrap();
        let matrix = encoder.encode_matrix(&records).unwrap();
        PriceModel::fit(&matrix, &prices, encoder.vocabulary().clone()).unwrap()
    }

    fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(model(), &ServiceConfig::default()));
        (create_router(state.clone()), state)
    }

    async fn post_json(router: Router, uri: &str, body: serde_json::Value) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    fn current_year() -> i32 {
        feature_engine::current_year()
    }

    #[tokio::test]
    async fn test_predict_success() {
        let (router, state) = app();
        let body = serde_json::json!({
            "brand": "Honda",
            "transmission": "Manual",
            "engine_size": 1498,
            "mileage": 40000,
            "model_year": current_year() - 5,
            "condition_score": 0.5
        });

        let (status, bytes) = post_json(router, "/api/v1/predict", body).await;
        assert_eq!(status, StatusCode::OK);

        let response: PredictResponse = serde_json::from_slice(&bytes).unwrap();
        assert!((response.base_price - (1_500_000.0 - 150_000.0 - 80_000.0)).abs() < 1e-3);
        assert!((response.adjustment_factor - 1.05).abs() < 1e-12);
        assert!(response.final_price >= response.base_price);
        assert_eq!(response.currency, "INR");
        assert_eq!(state.predictions_served.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_predict_validation_error_is_recoverable() {
        let (router, state) = app();
        let bad = serde_json::json!({
            "brand": "Honda",
            "transmission": "Manual",
            "engine_size": 9000,
            "mileage": 40000,
            "model_year": 2015
        });

        let (status, bytes) = post_json(router.clone(), "/api/v1/predict", bad).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(error.error.contains("engine_size"));

        let good = serde_json::json!({
            "brand": "Honda",
            "transmission": "Manual",
            "engine_size": 1200,
            "mileage": 40000,
            "model_year": 2015
        });
        let (status, _) = post_json(router, "/api/v1/predict", good).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(state.predictions_failed.load(Ordering::Relaxed), 1);
        assert_eq!(state.predictions_served.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_predict_future_model_year_rejected() {
        let (router, _) = app();
        let body = serde_json::json!({
            "brand": "Kia",
            "transmission": "Automatic",
            "engine_size": 1500,
            "mileage": 5000,
            "model_year": current_year() + 1
        });
        let (status, _) = post_json(router, "/api/v1/predict", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_non_positive_price_rejected() {
        let (router, _) = app();
        // 1995 car with 300k km: 1.5M - 30k·age - 600k goes negative
        let body = serde_json::json!({
            "brand": "Maruti",
            "transmission": "Manual",
            "engine_size": 800,
            "mileage": 300000,
            "model_year": 1995
        });
        let (status, bytes) = post_json(router, "/api/v1/predict", body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(error.error.contains("non-positive"));
    }

    #[tokio::test]
    async fn test_model_info() {
        let (router, state) = app();
        let (status, bytes) = get_json(router, "/api/v1/model").await;
        assert_eq!(status, StatusCode::OK);

        let info: ModelInfoResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(info.columns, state.predictor.model().schema().columns());
        assert_eq!(info.n_samples, 80);
    }

    #[tokio::test]
    async fn test_catalog() {
        let (router, _) = app();
        let (status, bytes) = get_json(router, "/api/v1/brands").await;
        assert_eq!(status, StatusCode::OK);

        let catalog: CatalogResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(catalog.brands.len(), 23);
        assert_eq!(catalog.transmissions, vec!["Manual", "Automatic"]);
        assert_eq!(catalog.engine_size_range, (600.0, 5000.0));
    }

    #[tokio::test]
    async fn test_health() {
        let (router, _) = app();
        let (status, bytes) = get_json(router, "/api/v1/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.predictions_served, 0);
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let (router, _) = app();
        let (status, _) = get_json(router, "/metrics").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_missing_artifact_is_fatal() {
        let config = ServiceConfig {
            model_path: "/nonexistent/car_price_model.json".into(),
            ..Default::default()
        };
        assert!(matches!(load_model(&config), Err(ArtifactError::NotFound(_))));
    }
}
