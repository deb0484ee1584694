//! Inference-Time Feature Alignment
//!
//! Reconciles a freshly encoded request against the schema a model was fit on.

use feature_engine::{EncodedVector, FeatureSchema};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::AlignError;

/// How to treat encoded columns the schema does not know
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignPolicy {
    /// Drop unknown columns and carry on
    #[default]
    Lenient,
    /// Fail when the request carries columns outside the schema
    Strict,
}

/// Aligned vector plus what had to change to get there
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Vector with exactly the schema's columns, in schema order
    pub vector: EncodedVector,
    /// Schema columns absent from the input, filled with 0
    pub zero_filled: Vec<String>,
    /// Input columns absent from the schema, discarded
    pub dropped: Vec<String>,
}

impl Alignment {
    /// Whether the input already matched the schema's column set
    pub fn is_exact(&self) -> bool {
        self.zero_filled.is_empty() && self.dropped.is_empty()
    }
}

/// Project `encoded` onto `schema`: schema order, missing columns as 0, extras dropped.
///
/// Never fails; with no overlap the result is all zeros.
pub fn align(encoded: &EncodedVector, schema: &FeatureSchema) -> EncodedVector {
    reconcile(encoded, schema).vector
}

/// Alignment under an explicit policy
pub fn align_with(
    encoded: &EncodedVector,
    schema: &FeatureSchema,
    policy: AlignPolicy,
) -> Result<Alignment, AlignError> {
    let alignment = reconcile(encoded, schema);

    if !alignment.zero_filled.is_empty() {
        debug!("Zero-filled columns absent from request: {:?}", alignment.zero_filled);
    }
    if !alignment.dropped.is_empty() {
        if policy == AlignPolicy::Strict {
            return Err(AlignError::UnexpectedColumns(alignment.dropped));
        }
        debug!("Dropped columns unknown to the model: {:?}", alignment.dropped);
    }

    Ok(alignment)
}

fn reconcile(encoded: &EncodedVector, schema: &FeatureSchema) -> Alignment {
    let mut zero_filled = Vec::new();

    let vector = EncodedVector::from_schema(schema, |column| {
        encoded.get(column).unwrap_or_else(|| {
            zero_filled.push(column.to_string());
            0.0
        })
    });

    let dropped = encoded
        .columns()
        .iter()
        .filter(|c| !schema.contains(c))
        .cloned()
        .collect();

    Alignment {
        vector,
        zero_filled,
        dropped,
    }
}
