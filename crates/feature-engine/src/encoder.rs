//! One-Hot Feature Encoder

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::SchemaError;
use crate::record::{CarRecord, TRANSMISSIONS};
use crate::schema::{CategoricalField, CategoryBlock, NumericColumn, Vocabulary};
use crate::vector::{EncodedVector, FeatureMatrix};

/// Whether records come from the training set or a serving request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeMode {
    Train,
    Infer,
}

/// Vocabulary learning options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncoderOptions {
    /// Drop the first (sorted) category of each field as the reference level
    pub drop_reference: bool,
    /// Require and pass through horsepower at train time
    pub include_horsepower: bool,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            drop_reference: true,
            include_horsepower: true,
        }
    }
}

/// Converts car records into fixed-order numeric feature vectors
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    vocabulary: Vocabulary,
}

impl FeatureEncoder {
    /// Learn the column vocabulary from a training set
    pub fn fit(records: &[CarRecord], options: EncoderOptions) -> Result<Self, SchemaError> {
        if records.is_empty() {
            return Err(SchemaError::EmptyDataset);
        }

        let fields = [CategoricalField::Brand, CategoricalField::Transmission];
        let mut seen: Vec<BTreeSet<&str>> = vec![BTreeSet::new(); fields.len()];

        for record in records {
            check_categoricals(record)?;
            check_transmission(record)?;
            if options.include_horsepower && record.horsepower.is_none() {
                return Err(SchemaError::MissingField(NumericColumn::Horsepower.as_str()));
            }
            for (field, values) in fields.iter().zip(seen.iter_mut()) {
                values.insert(field.value(record));
            }
        }

        let blocks = fields
            .iter()
            .zip(seen)
            .map(|(&field, values)| {
                let mut categories: Vec<String> = values.into_iter().map(str::to_string).collect();
                let reference = if options.drop_reference && !categories.is_empty() {
                    Some(categories.remove(0))
                } else {
                    None
                };
                CategoryBlock {
                    field,
                    categories,
                    reference,
                }
            })
            .collect();

        let numeric = NumericColumn::ALL
            .into_iter()
            .filter(|&n| options.include_horsepower || n != NumericColumn::Horsepower)
            .collect();

        let vocabulary = Vocabulary { blocks, numeric };
        info!(
            "Learned vocabulary from {} records: {} columns",
            records.len(),
            vocabulary.columns().len()
        );

        Ok(Self { vocabulary })
    }

    /// Rebuild an encoder from a persisted vocabulary
    pub fn from_vocabulary(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Encode records for the given mode
    pub fn encode(
        &self,
        records: &[CarRecord],
        mode: EncodeMode,
    ) -> Result<Vec<EncodedVector>, SchemaError> {
        records.iter().map(|r| self.encode_one(r, mode)).collect()
    }

    /// Encode a single record
    pub fn encode_one(&self, record: &CarRecord, mode: EncodeMode) -> Result<EncodedVector, SchemaError> {
        check_categoricals(record)?;
        if mode == EncodeMode::Train {
            check_transmission(record)?;
        }

        let mut vector = EncodedVector::with_capacity(self.vocabulary.columns().len());

        for block in &self.vocabulary.blocks {
            let value = block.field.value(record);
            if !block.knows(value) {
                if mode == EncodeMode::Train {
                    return Err(SchemaError::UnknownCategory {
                        field: block.field.as_str(),
                        value: value.to_string(),
                    });
                }
                debug!(
                    "Unseen {} '{}', encoding as all-zero block",
                    block.field.as_str(),
                    value
                );
            }
            for category in &block.categories {
                let hot = if category == value { 1.0 } else { 0.0 };
                vector.push(block.field.column(category), hot)?;
            }
        }

        match mode {
            EncodeMode::Train => {
                for column in &self.vocabulary.numeric {
                    let value = column
                        .value(record)
                        .ok_or(SchemaError::MissingField(column.as_str()))?;
                    vector.push(column.as_str(), value)?;
                }
            }
            EncodeMode::Infer => {
                // whatever the request carries; alignment reconciles it with the schema
                for column in NumericColumn::ALL {
                    if let Some(value) = column.value(record) {
                        vector.push(column.as_str(), value)?;
                    }
                }
            }
        }

        Ok(vector)
    }

    /// TRAIN-mode encoding of a whole dataset as a matrix
    pub fn encode_matrix(&self, records: &[CarRecord]) -> Result<FeatureMatrix, SchemaError> {
        let rows = self.encode(records, EncodeMode::Train)?;
        FeatureMatrix::from_rows(self.vocabulary.columns(), &rows)
    }
}

fn check_categoricals(record: &CarRecord) -> Result<(), SchemaError> {
    if record.brand.trim().is_empty() {
        return Err(SchemaError::MissingField("brand"));
    }
    if record.transmission.trim().is_empty() {
        return Err(SchemaError::MissingField("transmission"));
    }
    Ok(())
}

fn check_transmission(record: &CarRecord) -> Result<(), SchemaError> {
    if TRANSMISSIONS.contains(&record.transmission.as_str()) {
        Ok(())
    } else {
        Err(SchemaError::UnknownCategory {
            field: "transmission",
            value: record.transmission.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(brand: &str, transmission: &str, horsepower: Option<f64>) -> CarRecord {
        CarRecord {
            brand: brand.to_string(),
            age: 5,
            mileage: 45_000,
            engine_size: 1197,
            horsepower,
            transmission: transmission.to_string(),
        }
    }

    fn training_set() -> Vec<CarRecord> {
        vec![
            record("Toyota", "Manual", Some(88.0)),
            record("Honda", "Automatic", Some(118.0)),
            record("BMW", "Automatic", Some(190.0)),
            record("Honda", "Manual", Some(98.0)),
        ]
    }

    #[test]
    fn test_fit_learns_sorted_vocabulary() {
        let encoder = FeatureEncoder::fit(&training_set(), EncoderOptions::default()).unwrap();
        let brands = encoder.vocabulary().block(CategoricalField::Brand).unwrap();

        assert_eq!(brands.reference.as_deref(), Some("BMW"));
        assert_eq!(brands.categories, vec!["Honda", "Toyota"]);
        assert_eq!(
            encoder.vocabulary().columns(),
            vec![
                "brand_Honda",
                "brand_Toyota",
                "transmission_Manual",
                "age",
                "horsepower",
                "mileage",
                "engine_size"
            ]
        );
    }

    #[test]
    fn test_fit_without_reference_drop() {
        let options = EncoderOptions {
            drop_reference: false,
            ..Default::default()
        };
        let encoder = FeatureEncoder::fit(&training_set(), options).unwrap();
        let transmissions = encoder
            .vocabulary()
            .block(CategoricalField::Transmission)
            .unwrap();
        assert_eq!(transmissions.categories, vec!["Automatic", "Manual"]);
        assert!(transmissions.reference.is_none());
    }

    #[test]
    fn test_train_requires_horsepower() {
        let mut records = training_set();
        records[2].horsepower = None;
        let result = FeatureEncoder::fit(&records, EncoderOptions::default());
        assert_eq!(result, Err(SchemaError::MissingField("horsepower")));
    }

    #[test]
    fn test_train_rejects_unknown_transmission() {
        let mut records = training_set();
        records[0].transmission = "CVT".to_string();
        let result = FeatureEncoder::fit(&records, EncoderOptions::default());
        assert!(matches!(result, Err(SchemaError::UnknownCategory { field: "transmission", .. })));
    }

    #[test]
    fn test_missing_brand() {
        let encoder = FeatureEncoder::fit(&training_set(), EncoderOptions::default()).unwrap();
        let result = encoder.encode_one(&record("", "Manual", None), EncodeMode::Infer);
        assert_eq!(result, Err(SchemaError::MissingField("brand")));
    }

    #[test]
    fn test_empty_dataset() {
        let result = FeatureEncoder::fit(&[], EncoderOptions::default());
        assert_eq!(result, Err(SchemaError::EmptyDataset));
    }

    #[test]
    fn test_infer_one_hot_and_passthrough() {
        let encoder = FeatureEncoder::fit(&training_set(), EncoderOptions::default()).unwrap();
        let encoded = encoder
            .encode_one(&record("Toyota", "Manual", None), EncodeMode::Infer)
            .unwrap();

        assert_eq!(encoded.get("brand_Toyota"), Some(1.0));
        assert_eq!(encoded.get("brand_Honda"), Some(0.0));
        assert_eq!(encoded.get("transmission_Manual"), Some(1.0));
        assert_eq!(encoded.get("mileage"), Some(45_000.0));
        assert_eq!(encoded.get("engine_size"), Some(1197.0));
        assert!(!encoded.contains("horsepower"));
    }

    #[test]
    fn test_unseen_category_is_all_zero() {
        let encoder = FeatureEncoder::fit(&training_set(), EncoderOptions::default()).unwrap();
        let encoded = encoder
            .encode_one(&record("Ferrari", "Automatic", None), EncodeMode::Infer)
            .unwrap();

        assert_eq!(encoded.get("brand_Honda"), Some(0.0));
        assert_eq!(encoded.get("brand_Toyota"), Some(0.0));
        assert!(!encoded.contains("brand_Ferrari"));
    }

    #[test]
    fn test_unseen_category_rejected_in_train_mode() {
        let encoder = FeatureEncoder::fit(&training_set(), EncoderOptions::default()).unwrap();
        let result = encoder.encode_one(&record("Ferrari", "Manual", Some(600.0)), EncodeMode::Train);
        assert!(matches!(result, Err(SchemaError::UnknownCategory { field: "brand", .. })));
    }

    #[test]
    fn test_encode_matrix() {
        let records = training_set();
        let encoder = FeatureEncoder::fit(&records, EncoderOptions::default()).unwrap();
        let matrix = encoder.encode_matrix(&records).unwrap();

        assert_eq!(matrix.n_rows(), 4);
        assert_eq!(matrix.columns(), encoder.vocabulary().columns().as_slice());
        // BMW is the reference level: no brand column set
        assert_eq!(matrix.values()[[2, 0]], 0.0);
        assert_eq!(matrix.values()[[2, 1]], 0.0);
        assert_eq!(matrix.values()[[2, 4]], 190.0);
    }

    proptest! {
        #[test]
        fn prop_unseen_brand_never_adds_columns(brand in "[A-Z][a-z]{2,10}", mileage in 1000u64..300_000) {
            let encoder = FeatureEncoder::fit(&training_set(), EncoderOptions::default()).unwrap();
            let mut car = record(&brand, "Manual", None);
            car.mileage = mileage;
            let encoded = encoder.encode_one(&car, EncodeMode::Infer).unwrap();

            let brand_block: Vec<f64> = encoded
                .iter()
                .filter(|(c, _)| c.starts_with("brand_"))
                .map(|(_, v)| v)
                .collect();
            prop_assert_eq!(brand_block.len(), 2);
            let known = ["Honda", "Toyota"].contains(&brand.as_str());
            prop_assert_eq!(brand_block.iter().sum::<f64>(), if known { 1.0 } else { 0.0 });
        }
    }
}
