//! Validation Error Types

use thiserror::Error;

/// Errors during request validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Value out of allowed range
    #[error("{field} value {value} is out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Brand outside the supported catalogue
    #[error("Unknown brand: {0}")]
    UnknownBrand(String),

    /// Transmission outside the supported set
    #[error("Unknown transmission: {0}")]
    UnknownTransmission(String),

    /// Model year later than the reference year
    #[error("Model year {model_year} is after {reference_year}")]
    FutureModelYear { model_year: i32, reference_year: i32 },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
}
