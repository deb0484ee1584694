//! Request Validation
//!
//! Range and catalogue checks for price prediction requests, and conversion
//! of a validated request into a [`feature_engine::CarRecord`].

mod error;
mod request;
mod validator;

pub use error::ValidationError;
pub use request::PriceRequest;
pub use validator::{ValidationConfig, ValidationResult, Validator, BRANDS};
