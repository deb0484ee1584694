//! Feature Schema and Category Vocabulary

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::record::CarRecord;

/// Current schema layout version
pub const SCHEMA_VERSION: u32 = 1;

/// Ordered list of columns a fitted model expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SchemaRepr")]
pub struct FeatureSchema {
    version: u32,
    columns: Vec<String>,
}

/// Unchecked wire form; deserialising goes through `with_version`
#[derive(Deserialize)]
struct SchemaRepr {
    version: u32,
    columns: Vec<String>,
}

impl TryFrom<SchemaRepr> for FeatureSchema {
    type Error = SchemaError;

    fn try_from(repr: SchemaRepr) -> Result<Self, Self::Error> {
        Self::with_version(repr.version, repr.columns)
    }
}

impl FeatureSchema {
    /// Create a schema at the current version
    pub fn new(columns: Vec<String>) -> Result<Self, SchemaError> {
        Self::with_version(SCHEMA_VERSION, columns)
    }

    /// Create a schema with an explicit version, rejecting duplicate columns
    pub fn with_version(version: u32, columns: Vec<String>) -> Result<Self, SchemaError> {
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].contains(column) {
                return Err(SchemaError::DuplicateColumn(column.clone()));
            }
        }
        Ok(Self { version, columns })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Index of a column in schema order
    pub fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.position(column).is_some()
    }
}

/// Categorical raw fields expanded by one-hot encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoricalField {
    Brand,
    Transmission,
}

impl CategoricalField {
    /// Raw field name, also used as the one-hot column prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoricalField::Brand => "brand",
            CategoricalField::Transmission => "transmission",
        }
    }

    /// Raw value of this field on a record
    pub fn value<'a>(&self, record: &'a CarRecord) -> &'a str {
        match self {
            CategoricalField::Brand => &record.brand,
            CategoricalField::Transmission => &record.transmission,
        }
    }

    /// One-hot column name for a category value
    pub fn column(&self, category: &str) -> String {
        format!("{}_{}", self.as_str(), category)
    }
}

/// Numeric raw fields passed through unchanged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumericColumn {
    Age,
    Horsepower,
    Mileage,
    EngineSize,
}

impl NumericColumn {
    /// Pass-through columns in encoding order
    pub const ALL: [NumericColumn; 4] = [
        NumericColumn::Age,
        NumericColumn::Horsepower,
        NumericColumn::Mileage,
        NumericColumn::EngineSize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NumericColumn::Age => "age",
            NumericColumn::Horsepower => "horsepower",
            NumericColumn::Mileage => "mileage",
            NumericColumn::EngineSize => "engine_size",
        }
    }

    /// Value on a record; `None` only for a missing horsepower
    pub fn value(&self, record: &CarRecord) -> Option<f64> {
        match self {
            NumericColumn::Age => Some(record.age as f64),
            NumericColumn::Horsepower => record.horsepower,
            NumericColumn::Mileage => Some(record.mileage as f64),
            NumericColumn::EngineSize => Some(record.engine_size as f64),
        }
    }
}

/// Categories observed for one field at train time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBlock {
    pub field: CategoricalField,
    /// Sorted distinct values that own a column
    pub categories: Vec<String>,
    /// Value dropped to avoid collinearity with the intercept
    pub reference: Option<String>,
}

impl CategoryBlock {
    /// Whether the value was seen at train time (owning a column or as the reference)
    pub fn knows(&self, value: &str) -> bool {
        self.reference.as_deref() == Some(value) || self.categories.iter().any(|c| c == value)
    }

    /// One-hot column names for this block
    pub fn columns(&self) -> impl Iterator<Item = String> + '_ {
        self.categories.iter().map(|c| self.field.column(c))
    }
}

/// Column vocabulary learned at train time and reused at inference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    pub blocks: Vec<CategoryBlock>,
    pub numeric: Vec<NumericColumn>,
}

impl Vocabulary {
    /// Block for a categorical field
    pub fn block(&self, field: CategoricalField) -> Option<&CategoryBlock> {
        self.blocks.iter().find(|b| b.field == field)
    }

    /// Full ordered column list: categorical blocks first, then numerics
    pub fn columns(&self) -> Vec<String> {
        self.blocks
            .iter()
            .flat_map(CategoryBlock::columns)
            .chain(self.numeric.iter().map(|n| n.as_str().to_string()))
            .collect()
    }

    /// Schema matching this vocabulary's columns
    pub fn schema(&self) -> Result<FeatureSchema, SchemaError> {
        FeatureSchema::new(self.columns())
    }

    /// Whether the numeric column was present at train time
    pub fn has_numeric(&self, column: NumericColumn) -> bool {
        self.numeric.contains(&column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> Vocabulary {
        Vocabulary {
            blocks: vec![
                CategoryBlock {
                    field: CategoricalField::Brand,
                    categories: vec!["Honda".into(), "Toyota".into()],
                    reference: Some("BMW".into()),
                },
                CategoryBlock {
                    field: CategoricalField::Transmission,
                    categories: vec!["Manual".into()],
                    reference: Some("Automatic".into()),
                },
            ],
            numeric: vec![NumericColumn::Age, NumericColumn::Mileage],
        }
    }

    #[test]
    fn test_vocabulary_column_order() {
        let columns = vocabulary().columns();
        assert_eq!(
            columns,
            vec!["brand_Honda", "brand_Toyota", "transmission_Manual", "age", "mileage"]
        );
    }

    #[test]
    fn test_reference_category_is_known() {
        let vocab = vocabulary();
        let brands = vocab.block(CategoricalField::Brand).unwrap();
        assert!(brands.knows("BMW"));
        assert!(brands.knows("Toyota"));
        assert!(!brands.knows("Ferrari"));
    }

    #[test]
    fn test_schema_rejects_duplicates() {
        let result = FeatureSchema::new(vec!["age".into(), "age".into()]);
        assert!(matches!(result, Err(SchemaError::DuplicateColumn(c)) if c == "age"));
    }

    #[test]
    fn test_schema_position() {
        let schema = vocabulary().schema().unwrap();
        assert_eq!(schema.version(), SCHEMA_VERSION);
        assert_eq!(schema.position("age"), Some(3));
        assert!(!schema.contains("horsepower"));
    }
}
