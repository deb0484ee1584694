//! Feature Engineering Engine
//!
//! Turns car listings into fixed-order numeric feature vectors: one-hot
//! expansion for categorical fields plus numeric pass-through, driven by a
//! vocabulary learned at train time and reused at inference.

mod encoder;
mod error;
mod record;
mod schema;
mod vector;

pub use encoder::{EncodeMode, EncoderOptions, FeatureEncoder};
pub use error::SchemaError;
pub use record::{current_year, derive_age, CarRecord, TRANSMISSIONS};
pub use schema::{
    CategoricalField, CategoryBlock, FeatureSchema, NumericColumn, Vocabulary, SCHEMA_VERSION,
};
pub use vector::{EncodedVector, FeatureMatrix};
