//! Fitted Price Model

use chrono::{DateTime, Utc};
use feature_engine::{EncodedVector, FeatureMatrix, FeatureSchema, Vocabulary};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ModelError;
use crate::evaluation::EvaluationMetrics;
use crate::regression;

/// Training provenance carried with the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// When the fit completed
    pub trained_at: DateTime<Utc>,
    /// Rows the coefficients were fit on
    pub n_samples: usize,
    /// Year ages were derived against during training
    pub reference_year: Option<i32>,
    /// Holdout quality, if the trainer evaluated one
    pub evaluation: Option<EvaluationMetrics>,
}

/// Linear price model frozen at fit time.
///
/// Coefficients are stored in schema order. Nothing mutates a model after
/// [`PriceModel::fit`] hands it out, so it can be shared across requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FittedModel {
    schema: FeatureSchema,
    vocabulary: Vocabulary,
    coefficients: Vec<f64>,
    intercept: f64,
    metadata: ModelMetadata,
}

impl FittedModel {
    /// The ordered columns `predict` expects
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Category vocabulary needed to re-encode serving requests
    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Coefficients in schema order
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Weight of a named column
    pub fn coefficient(&self, column: &str) -> Option<f64> {
        self.schema.position(column).map(|i| self.coefficients[i])
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    /// Predict a price for an aligned vector
    pub fn predict(&self, x: &EncodedVector) -> Result<f64, ModelError> {
        PriceModel::predict(self, x)
    }

    /// Attach provenance gathered after the fit (holdout metrics, reference year)
    pub fn with_metadata(mut self, reference_year: Option<i32>, evaluation: Option<EvaluationMetrics>) -> Self {
        self.metadata.reference_year = reference_year;
        self.metadata.evaluation = evaluation;
        self
    }

    /// Structural checks used after deserialising an artifact
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        if self.coefficients.len() != self.schema.len() {
            return Err(format!(
                "{} coefficients for {} schema columns",
                self.coefficients.len(),
                self.schema.len()
            ));
        }
        if self.vocabulary.columns() != self.schema.columns() {
            return Err("vocabulary columns differ from the feature schema".to_string());
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err("non-finite coefficient".to_string());
        }
        Ok(())
    }
}

/// Ordinary least-squares price regression
pub struct PriceModel;

impl PriceModel {
    /// Fit on a TRAIN-mode matrix, freezing its column order as the schema
    pub fn fit(x: &FeatureMatrix, y: &[f64], vocabulary: Vocabulary) -> Result<FittedModel, ModelError> {
        if vocabulary.columns() != x.columns() {
            return Err(ModelError::SchemaMismatch(
                "training matrix columns differ from the vocabulary".to_string(),
            ));
        }

        let schema = FeatureSchema::new(x.columns().to_vec())?;
        let targets = ndarray::ArrayView1::from(y);
        // blocks that kept every category sum to one on each row
        let full_blocks: Vec<Vec<usize>> = vocabulary
            .blocks
            .iter()
            .filter(|b| b.reference.is_none() && b.categories.len() > 1)
            .map(|b| b.columns().filter_map(|c| schema.position(&c)).collect())
            .collect();
        let solution =
            regression::solve_with_full_blocks(x.values().view(), targets, schema.columns(), &full_blocks)?;

        info!(
            "Fit linear model on {} rows x {} columns (intercept={:.2})",
            x.n_rows(),
            x.n_cols(),
            solution.intercept
        );

        Ok(FittedModel {
            schema,
            vocabulary,
            coefficients: solution.coefficients,
            intercept: solution.intercept,
            metadata: ModelMetadata {
                trained_at: Utc::now(),
                n_samples: x.n_rows(),
                reference_year: None,
                evaluation: None,
            },
        })
    }

    /// `intercept + Σ coefficient_i · x_i` over the schema, in schema order.
    ///
    /// The vector must already carry exactly the schema's columns in order.
    pub fn predict(model: &FittedModel, x: &EncodedVector) -> Result<f64, ModelError> {
        if x.columns() != model.schema.columns() {
            let detail = match model
                .schema
                .columns()
                .iter()
                .zip(x.columns())
                .position(|(expected, actual)| expected != actual)
            {
                Some(i) => format!(
                    "column {} is '{}', expected '{}'",
                    i,
                    x.columns()[i],
                    model.schema.columns()[i]
                ),
                None => format!("{} columns, expected {}", x.len(), model.schema.len()),
            };
            return Err(ModelError::SchemaMismatch(detail));
        }

        Ok(model.intercept
            + model
                .coefficients
                .iter()
                .zip(x.values())
                .map(|(c, v)| c * v)
                .sum::<f64>())
    }

    /// Predict every row of a TRAIN-mode matrix
    pub fn predict_matrix(model: &FittedModel, x: &FeatureMatrix) -> Result<Vec<f64>, ModelError> {
        if x.columns() != model.schema.columns() {
            return Err(ModelError::SchemaMismatch(
                "matrix columns differ from the model schema".to_string(),
            ));
        }
        let coefficients = ndarray::ArrayView1::from(model.coefficients.as_slice());
        Ok(x.values()
            .dot(&coefficients)
            .mapv(|v| v + model.intercept)
            .to_vec())
    }
}
