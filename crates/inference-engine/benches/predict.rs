//! Prediction path benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use feature_engine::{CarRecord, EncoderOptions, FeatureEncoder};
use inference_engine::{align, predict_price, AdjustmentFactor};
use price_model::{FittedModel, PriceModel};

const BRANDS: [&str; 6] = ["Maruti", "Hyundai", "Tata", "Honda", "Toyota", "BMW"];

fn listing(i: usize) -> CarRecord {
    CarRecord {
        brand: BRANDS[i % BRANDS.len()].to_string(),
        age: (i % 20) as u32,
        mileage: 1_000 + ((i * 7_919) % 299_000) as u64,
        engine_size: 600 + ((i * 431) % 4_401) as u32,
        horsepower: Some(60.0 + ((i * 13) % 400) as f64),
        transmission: if (i / 7) % 2 == 0 { "Manual" } else { "Automatic" }.to_string(),
    }
}

fn model() -> FittedModel {
    let records: Vec<CarRecord> = (0..2_000).map(listing).collect();
    let prices: Vec<f64> = records
        .iter()
        .map(|r| 1_200_000.0 - 40_000.0 * r.age as f64 - 1.2 * r.mileage as f64)
        .collect();
    let encoder = FeatureEncoder::fit(&records, EncoderOptions::default()).unwrap();
    let matrix = encoder.encode_matrix(&records).unwrap();
    PriceModel::fit(&matrix, &prices, encoder.vocabulary().clone()).unwrap()
}

fn bench_predict_price(c: &mut Criterion) {
    let model = model();
    let request = CarRecord {
        horsepower: None,
        ..listing(7)
    };

    c.bench_function("predict_price", |b| {
        b.iter(|| predict_price(black_box(&request), &model, AdjustmentFactor::NONE))
    });
}

fn bench_align(c: &mut Criterion) {
    let model = model();
    let encoder = FeatureEncoder::from_vocabulary(model.vocabulary().clone());
    let encoded = encoder
        .encode_one(&listing(11), feature_engine::EncodeMode::Infer)
        .unwrap();

    c.bench_function("align", |b| b.iter(|| align(black_box(&encoded), model.schema())));
}

criterion_group!(benches, bench_predict_price, bench_align);
criterion_main!(benches);
