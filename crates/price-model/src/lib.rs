//! Car Price Model
//!
//! Ordinary least-squares regression over encoded car features, the frozen
//! [`FittedModel`] it produces, and the artifact format used to hand the model
//! from the offline trainer to the serving process.

pub mod artifact;
mod error;
mod evaluation;
mod model;
mod regression;

pub use artifact::{ArtifactFormat, ARTIFACT_VERSION};
pub use error::{ArtifactError, ModelError};
pub use evaluation::EvaluationMetrics;
pub use model::{FittedModel, ModelMetadata, PriceModel};
