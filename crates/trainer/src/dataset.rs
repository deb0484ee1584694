//! Training Dataset Loading

use std::path::Path;

use feature_engine::{derive_age, CarRecord};
use serde::Deserialize;
use tracing::{info, warn};

use crate::TrainError;

/// Header columns the training file must provide
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "brand",
    "model_year",
    "horsepower",
    "mileage",
    "engine_size",
    "transmission",
    "price",
];

/// One CSV row; every field may be blank
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingRow {
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model_year: Option<i32>,
    #[serde(default)]
    pub horsepower: Option<f64>,
    #[serde(default)]
    pub mileage: Option<f64>,
    #[serde(default)]
    pub engine_size: Option<f64>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

impl ListingRow {
    /// Name of the first blank required field
    fn first_missing(&self) -> Option<&'static str> {
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());
        if blank(&self.brand) {
            Some("brand")
        } else if self.model_year.is_none() {
            Some("model_year")
        } else if self.horsepower.is_none() {
            Some("horsepower")
        } else if self.mileage.is_none() {
            Some("mileage")
        } else if self.engine_size.is_none() {
            Some("engine_size")
        } else if blank(&self.transmission) {
            Some("transmission")
        } else if self.price.is_none() {
            Some("price")
        } else {
            None
        }
    }

    /// Convert into a record and target price, deriving age from `reference_year`
    pub fn into_listing(self, row: usize, reference_year: i32) -> Result<(CarRecord, f64), TrainError> {
        if let Some(field) = self.first_missing() {
            return Err(TrainError::MissingValue { row, field });
        }

        let mileage = non_negative(row, "mileage", self.mileage.unwrap_or_default())?;
        let engine_size = non_negative(row, "engine_size", self.engine_size.unwrap_or_default())?;
        let horsepower = non_negative(row, "horsepower", self.horsepower.unwrap_or_default())?;
        let price = self.price.unwrap_or_default();
        if !price.is_finite() {
            return Err(TrainError::InvalidValue {
                row,
                field: "price",
                value: price,
            });
        }

        let record = CarRecord {
            brand: self.brand.unwrap_or_default().trim().to_string(),
            age: derive_age(self.model_year.unwrap_or_default(), reference_year),
            mileage: mileage.round() as u64,
            engine_size: engine_size.round() as u32,
            horsepower: Some(horsepower),
            transmission: self.transmission.unwrap_or_default().trim().to_string(),
        };
        Ok((record, price))
    }
}

fn non_negative(row: usize, field: &'static str, value: f64) -> Result<f64, TrainError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(TrainError::InvalidValue { row, field, value })
    }
}

/// Listings ready for encoding
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<CarRecord>,
    pub prices: Vec<f64>,
    /// Rows dropped for missing values
    pub skipped: usize,
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Subset by row index, in the given order
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            prices: indices.iter().map(|&i| self.prices[i]).collect(),
            skipped: 0,
        }
    }
}

/// Read a listings CSV.
///
/// With `drop_incomplete`, rows with a blank required field are skipped with a
/// warning; otherwise the first such row fails the load.
pub fn load_csv(path: &Path, reference_year: i32, drop_incomplete: bool) -> Result<Dataset, TrainError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    parse(&mut reader, reference_year, drop_incomplete).map(|dataset| {
        info!(
            "Loaded {} listings from {} ({} skipped)",
            dataset.len(),
            path.display(),
            dataset.skipped
        );
        dataset
    })
}

/// Parse listings from any CSV reader
pub fn parse<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
    reference_year: i32,
    drop_incomplete: bool,
) -> Result<Dataset, TrainError> {
    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(TrainError::MissingColumn(column));
        }
    }

    let mut dataset = Dataset::default();
    for (index, row) in reader.deserialize::<ListingRow>().enumerate() {
        // header is line 1
        let line = index + 2;
        match row?.into_listing(line, reference_year) {
            Ok((record, price)) => {
                dataset.records.push(record);
                dataset.prices.push(price);
            }
            Err(TrainError::MissingValue { row, field }) if drop_incomplete => {
                warn!("Skipping line {}: missing {}", row, field);
                dataset.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    if dataset.is_empty() {
        return Err(TrainError::EmptyDataset);
    }
    Ok(dataset)
}
