//! Raw Prediction Requests

use serde::{Deserialize, Serialize};

/// Car details as submitted by a user. `age` is never supplied directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRequest {
    pub brand: String,
    pub transmission: String,
    /// Engine displacement (cc)
    pub engine_size: u32,
    /// Odometer reading (km)
    pub mileage: u64,
    pub model_year: i32,
    /// Optional visual condition score in [0, 1]
    #[serde(default)]
    pub condition_score: Option<f64>,
}
