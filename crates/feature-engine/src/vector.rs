//! Encoded Feature Vectors

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;
use crate::schema::FeatureSchema;

/// Ordered mapping from feature column name to value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodedVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl EncodedVector {
    /// Create an empty vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty vector with room for `capacity` columns
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
        }
    }

    /// Build from ordered `(column, value)` pairs, rejecting duplicate names
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut vector = Self::new();
        for (column, value) in pairs {
            vector.push(column, value)?;
        }
        Ok(vector)
    }

    /// One value per schema column, in schema order.
    ///
    /// Schema columns are unique, so no duplicate check is needed.
    pub fn from_schema(schema: &FeatureSchema, mut value: impl FnMut(&str) -> f64) -> Self {
        Self {
            columns: schema.columns().to_vec(),
            values: schema.columns().iter().map(|c| value(c)).collect(),
        }
    }

    /// Append a column at the end
    pub fn push(&mut self, column: impl Into<String>, value: f64) -> Result<(), SchemaError> {
        let column = column.into();
        if self.contains(&column) {
            return Err(SchemaError::DuplicateColumn(column));
        }
        self.columns.push(column);
        self.values.push(value);
        Ok(())
    }

    /// Value of a column, if present
    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }

    /// Whether the column is present
    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in column order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterate `(column, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Row-major TRAIN-mode encoding of a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Assemble encoded rows that all share the same column order
    pub fn from_rows(columns: Vec<String>, rows: &[EncodedVector]) -> Result<Self, SchemaError> {
        let mut values = Array2::zeros((rows.len(), columns.len()));
        for (i, row) in rows.iter().enumerate() {
            if row.columns() != columns.as_slice() {
                return Err(SchemaError::InconsistentRow(i));
            }
            for (j, value) in row.values().iter().enumerate() {
                values[[i, j]] = *value;
            }
        }
        Ok(Self { columns, values })
    }

    /// Column names, in the order the model will freeze as its schema
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// Rows selected by index, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Self {
            columns: self.columns.clone(),
            values: self.values.select(ndarray::Axis(0), indices),
        }
    }

    /// Single row as an [`EncodedVector`]
    pub fn row(&self, index: usize) -> EncodedVector {
        EncodedVector {
            columns: self.columns.clone(),
            values: self.values.row(index).to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut vector = EncodedVector::new();
        vector.push("age", 4.0).unwrap();
        vector.push("mileage", 42_000.0).unwrap();

        assert_eq!(vector.len(), 2);
        assert_eq!(vector.get("mileage"), Some(42_000.0));
        assert_eq!(vector.get("horsepower"), None);
        assert_eq!(vector.columns(), &["age".to_string(), "mileage".to_string()]);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let result = EncodedVector::from_pairs([("age", 1.0), ("age", 2.0)]);
        assert_eq!(result, Err(SchemaError::DuplicateColumn("age".to_string())));
    }

    #[test]
    fn test_from_schema_follows_schema_order() {
        let schema = FeatureSchema::new(vec!["mileage".into(), "age".into()]).unwrap();
        let vector = EncodedVector::from_schema(&schema, |c| if c == "age" { 5.0 } else { 0.0 });
        assert_eq!(vector.columns(), schema.columns());
        assert_eq!(vector.values(), &[0.0, 5.0]);
    }

    #[test]
    fn test_matrix_from_rows() {
        let columns = vec!["a".to_string(), "b".to_string()];
        let rows = vec![
            EncodedVector::from_pairs([("a", 1.0), ("b", 2.0)]).unwrap(),
            EncodedVector::from_pairs([("a", 3.0), ("b", 4.0)]).unwrap(),
        ];
        let matrix = FeatureMatrix::from_rows(columns, &rows).unwrap();

        assert_eq!(matrix.n_rows(), 2);
        assert_eq!(matrix.n_cols(), 2);
        assert_eq!(matrix.values()[[1, 0]], 3.0);
        assert_eq!(matrix.row(1), rows[1]);
        assert_eq!(matrix.select_rows(&[1]).values()[[0, 1]], 4.0);
    }
}
