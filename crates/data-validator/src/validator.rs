//! Request Validator for Range and Catalogue Checking

use feature_engine::{current_year, derive_age, CarRecord, TRANSMISSIONS};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::request::PriceRequest;

/// Brands offered by the prediction form
pub const BRANDS: [&str; 23] = [
    "Maruti", "Hyundai", "Tata", "Honda", "Mahindra", "Kia", "Toyota", "Ford", "Renault",
    "Volkswagen", "Nissan", "Skoda", "BMW", "Audi", "Mercedes", "MG", "Jaguar", "Porsche",
    "Ferrari", "Bentley", "Citroen", "Volvo", "Jeep",
];

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Engine size valid range (cc)
    pub engine_size_range: (f64, f64),
    /// Mileage valid range (km)
    pub mileage_range: (f64, f64),
    /// Oldest accepted model year
    pub min_model_year: i32,
    /// Latest accepted model year; `None` means the current year
    pub max_model_year: Option<i32>,
    /// Accepted brands
    pub brands: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            engine_size_range: (600.0, 5000.0),
            mileage_range: (1000.0, 300_000.0),
            min_model_year: 1995,
            max_model_year: None,
            brands: BRANDS.iter().map(|b| b.to_string()).collect(),
        }
    }
}

/// Result of validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether all values are valid
    pub valid: bool,
    /// List of validation errors
    pub errors: Vec<ValidationError>,
    /// Number of fields validated
    pub fields_checked: usize,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid(fields_checked: usize) -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            fields_checked,
        }
    }

    /// Create an invalid result with errors
    pub fn invalid(errors: Vec<ValidationError>, fields_checked: usize) -> Self {
        Self {
            valid: false,
            errors,
            fields_checked,
        }
    }
}

/// Validator for prediction requests
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate a single value against a range
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Validate brand membership
    pub fn validate_brand(&self, brand: &str) -> Result<(), ValidationError> {
        if brand.trim().is_empty() {
            return Err(ValidationError::MissingField("brand"));
        }
        if self.config.brands.iter().any(|b| b == brand) {
            Ok(())
        } else {
            Err(ValidationError::UnknownBrand(brand.to_string()))
        }
    }

    /// Validate transmission membership
    pub fn validate_transmission(&self, transmission: &str) -> Result<(), ValidationError> {
        if transmission.trim().is_empty() {
            return Err(ValidationError::MissingField("transmission"));
        }
        if TRANSMISSIONS.contains(&transmission) {
            Ok(())
        } else {
            Err(ValidationError::UnknownTransmission(transmission.to_string()))
        }
    }

    /// Validate engine size (cc)
    pub fn validate_engine_size(&self, engine_size: u32) -> Result<(), ValidationError> {
        self.validate_range("engine_size", engine_size as f64, self.config.engine_size_range)
    }

    /// Validate mileage (km)
    pub fn validate_mileage(&self, mileage: u64) -> Result<(), ValidationError> {
        self.validate_range("mileage", mileage as f64, self.config.mileage_range)
    }

    /// Validate model year against `[min_model_year, reference_year]`
    pub fn validate_model_year(&self, model_year: i32, reference_year: i32) -> Result<(), ValidationError> {
        if model_year > reference_year {
            return Err(ValidationError::FutureModelYear {
                model_year,
                reference_year,
            });
        }
        let max = self.config.max_model_year.unwrap_or(reference_year);
        self.validate_range(
            "model_year",
            model_year as f64,
            (self.config.min_model_year as f64, max as f64),
        )
    }

    /// Validate condition score, if supplied
    pub fn validate_condition_score(&self, score: Option<f64>) -> Result<(), ValidationError> {
        match score {
            Some(s) if s.is_nan() => Err(ValidationError::OutOfRange {
                field: "condition_score",
                value: s,
                min: 0.0,
                max: 1.0,
            }),
            Some(s) => self.validate_range("condition_score", s, (0.0, 1.0)),
            None => Ok(()),
        }
    }

    /// Check every field and collect all failures
    pub fn validate_all(&self, request: &PriceRequest, reference_year: i32) -> ValidationResult {
        let checks = [
            self.validate_brand(&request.brand),
            self.validate_transmission(&request.transmission),
            self.validate_engine_size(request.engine_size),
            self.validate_mileage(request.mileage),
            self.validate_model_year(request.model_year, reference_year),
            self.validate_condition_score(request.condition_score),
        ];
        let fields_checked = checks.len();
        let errors: Vec<ValidationError> = checks.into_iter().filter_map(Result::err).collect();

        if errors.is_empty() {
            ValidationResult::valid(fields_checked)
        } else {
            ValidationResult::invalid(errors, fields_checked)
        }
    }

    /// Validate a request and turn it into a record, deriving age from the current year
    pub fn to_record(&self, request: &PriceRequest) -> Result<CarRecord, ValidationError> {
        self.to_record_at(request, current_year())
    }

    /// [`Validator::to_record`] against an explicit reference year
    pub fn to_record_at(&self, request: &PriceRequest, reference_year: i32) -> Result<CarRecord, ValidationError> {
        let result = self.validate_all(request, reference_year);
        if let Some(first) = result.errors.into_iter().next() {
            debug!("Rejected request: {}", first);
            return Err(first);
        }

        Ok(CarRecord {
            brand: request.brand.clone(),
            age: derive_age(request.model_year, reference_year),
            mileage: request.mileage,
            engine_size: request.engine_size,
            horsepower: None,
            transmission: request.transmission.clone(),
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
