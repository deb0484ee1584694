//! Car Records

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Transmission values accepted by the encoder at train time
pub const TRANSMISSIONS: [&str; 2] = ["Manual", "Automatic"];

/// A preprocessed car listing.
///
/// `age` is always derived from a model year through [`derive_age`]; the raw
/// model year never travels past preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarRecord {
    /// Manufacturer brand (categorical)
    pub brand: String,
    /// Age in whole years
    pub age: u32,
    /// Odometer reading (km)
    pub mileage: u64,
    /// Engine displacement (cc)
    pub engine_size: u32,
    /// Engine power, only known for training listings
    pub horsepower: Option<f64>,
    /// Transmission type (categorical)
    pub transmission: String,
}

impl CarRecord {
    /// Build a record from a model year, deriving the age against `reference_year`
    pub fn from_model_year(
        brand: impl Into<String>,
        model_year: i32,
        reference_year: i32,
        mileage: u64,
        engine_size: u32,
        horsepower: Option<f64>,
        transmission: impl Into<String>,
    ) -> Self {
        Self {
            brand: brand.into(),
            age: derive_age(model_year, reference_year),
            mileage,
            engine_size,
            horsepower,
            transmission: transmission.into(),
        }
    }
}

/// Age of a car relative to `reference_year`.
///
/// A model year after the reference year saturates to 0.
pub fn derive_age(model_year: i32, reference_year: i32) -> u32 {
    let age = reference_year - model_year;
    if age < 0 {
        warn!(
            "Model year {} is after reference year {}, clamping age to 0",
            model_year, reference_year
        );
        0
    } else {
        age as u32
    }
}

/// Current calendar year (UTC)
pub fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year()
}
