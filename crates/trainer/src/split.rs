//! Reproducible Train/Test Split

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices for each side of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a seeded generator and hold out `ceil(n · test_fraction)` rows.
///
/// The training side always keeps at least one row; a fraction of 0 (or a
/// single row) yields an empty test side.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Split {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let fraction = if test_fraction.is_finite() {
        test_fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let n_test = ((n as f64) * fraction).ceil() as usize;
    let n_test = n_test.min(n.saturating_sub(1));

    let train = indices.split_off(n_test);
    Split {
        train,
        test: indices,
    }
}
