//! Model and Artifact Error Types

use std::path::PathBuf;

use feature_engine::SchemaError;
use thiserror::Error;

/// Errors during fitting or prediction
#[derive(Debug, Error)]
pub enum ModelError {
    /// Feature vector columns do not match the fitted schema
    #[error("Feature vector does not match model schema: {0}")]
    SchemaMismatch(String),

    /// Matrix rows and target length disagree
    #[error("Dimension mismatch: {rows} feature rows, {targets} targets")]
    DimensionMismatch { rows: usize, targets: usize },

    /// Not enough rows to determine the coefficients
    #[error("Insufficient samples: need at least {required}, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    /// Design matrix is rank deficient
    #[error("Design matrix is singular near column '{0}'")]
    Singular(String),

    /// Target contains NaN or infinity
    #[error("Non-finite value in {0}")]
    NonFinite(&'static str),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors reading or writing a persisted model
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Model artifact not found at {0}")]
    NotFound(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt JSON artifact: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Corrupt binary artifact: {0}")]
    Postcard(#[from] postcard::Error),

    #[error("Unsupported artifact format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("Inconsistent artifact: {0}")]
    Inconsistent(String),
}
