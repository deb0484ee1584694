//! Encoding Error Types

use thiserror::Error;

/// Errors raised while turning car records into feature vectors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// A raw field required by the encoding mode is absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Category value outside the fixed set, seen at train time
    #[error("Unrecognized {field} category '{value}'")]
    UnknownCategory { field: &'static str, value: String },

    /// Nothing to learn a vocabulary from
    #[error("Cannot build a vocabulary from an empty dataset")]
    EmptyDataset,

    /// Column name appears twice in a vector or schema
    #[error("Duplicate feature column: {0}")]
    DuplicateColumn(String),

    /// A row's columns differ from the matrix header
    #[error("Row {0} does not match the matrix columns")]
    InconsistentRow(usize),
}
