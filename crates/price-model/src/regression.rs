//! Ordinary Least Squares Solver
//!
//! Solves the normal equations on centred and scaled columns with a Cholesky
//! factorisation, then maps the solution back to raw feature units. The solve
//! has no randomness, so identical inputs give bit-identical coefficients.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use tracing::debug;

use crate::error::ModelError;

/// Columns whose spread falls below this are treated as constant
const CONSTANT_COLUMN_EPS: f64 = 1e-12;

/// Relative pivot threshold for detecting collinear columns
const SINGULAR_PIVOT_EPS: f64 = 1e-10;

/// Raw OLS solution in input column order
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquares {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Fit `y ≈ intercept + x · coefficients`.
///
/// Constant columns cannot be separated from the intercept and get a zero
/// coefficient. `names` is only used to report which column is collinear.
pub fn solve(x: ArrayView2<f64>, y: ArrayView1<f64>, names: &[String]) -> Result<LeastSquares, ModelError> {
    let (n_samples, n_features) = x.dim();

    if n_samples != y.len() {
        return Err(ModelError::DimensionMismatch {
            rows: n_samples,
            targets: y.len(),
        });
    }
    if n_samples == 0 {
        return Err(ModelError::InsufficientSamples {
            required: 1,
            actual: 0,
        });
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::NonFinite("feature matrix"));
    }
    if y.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::NonFinite("target prices"));
    }

    let n = n_samples as f64;
    let means = x.sum_axis(Axis(0)) / n;
    let stds = x.std_axis(Axis(0), 0.0);
    let y_mean = y.sum() / n;

    let active: Vec<usize> = (0..n_features)
        .filter(|&j| stds[j] > CONSTANT_COLUMN_EPS * means[j].abs().max(1.0))
        .collect();

    if active.len() < n_features {
        debug!(
            "{} constant column(s) pinned to zero coefficient",
            n_features - active.len()
        );
    }

    // intercept + one coefficient per varying column
    if n_samples < active.len() + 1 {
        return Err(ModelError::InsufficientSamples {
            required: active.len() + 1,
            actual: n_samples,
        });
    }

    let mut z = Array2::<f64>::zeros((n_samples, active.len()));
    for (k, &j) in active.iter().enumerate() {
        let column = x.column(j);
        z.column_mut(k)
            .assign(&column.mapv(|v| (v - means[j]) / stds[j]));
    }
    let y_centred = y.mapv(|v| v - y_mean);

    let ztz = z.t().dot(&z);
    let zty = z.t().dot(&y_centred);

    let scaled = cholesky_solve(&ztz, &zty).map_err(|pivot| {
        let column = active
            .get(pivot)
            .and_then(|&j| names.get(j))
            .cloned()
            .unwrap_or_else(|| format!("#{}", pivot));
        ModelError::Singular(column)
    })?;

    let mut coefficients = vec![0.0; n_features];
    for (k, &j) in active.iter().enumerate() {
        coefficients[j] = scaled[k] / stds[j];
    }
    let intercept = y_mean
        - coefficients
            .iter()
            .zip(means.iter())
            .map(|(b, m)| b * m)
            .sum::<f64>();

    Ok(LeastSquares {
        coefficients,
        intercept,
    })
}

/// Fit with full one-hot blocks, each summing to one on every row.
///
/// A full block is collinear with the intercept, so its last column is held
/// out of the solve. Each block's coefficients are then shifted to zero mean,
/// which picks the minimum-norm solution and leaves predictions unchanged.
pub fn solve_with_full_blocks(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    names: &[String],
    blocks: &[Vec<usize>],
) -> Result<LeastSquares, ModelError> {
    if blocks.is_empty() {
        return solve(x, y, names);
    }

    let n_features = x.ncols();
    let held_out: Vec<usize> = blocks.iter().filter_map(|b| b.last().copied()).collect();
    let kept: Vec<usize> = (0..n_features).filter(|j| !held_out.contains(j)).collect();
    let kept_names: Vec<String> = kept
        .iter()
        .map(|&j| names.get(j).cloned().unwrap_or_else(|| format!("#{}", j)))
        .collect();

    let reduced = solve(x.select(Axis(1), &kept).view(), y, &kept_names)?;

    let mut coefficients = vec![0.0; n_features];
    for (k, &j) in kept.iter().enumerate() {
        coefficients[j] = reduced.coefficients[k];
    }
    for block in blocks.iter().filter(|b| !b.is_empty()) {
        let mean = block.iter().map(|&j| coefficients[j]).sum::<f64>() / block.len() as f64;
        for &j in block {
            coefficients[j] -= mean;
        }
    }
    debug!("Centred {} full one-hot block(s)", blocks.len());

    let n = x.nrows() as f64;
    let means = x.sum_axis(Axis(0)) / n;
    let intercept = y.sum() / n
        - coefficients
            .iter()
            .zip(means.iter())
            .map(|(b, m)| b * m)
            .sum::<f64>();

    Ok(LeastSquares {
        coefficients,
        intercept,
    })
}

/// Solve `a · x = b` for symmetric positive definite `a`.
///
/// On failure returns the index of the pivot that was not positive.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, usize> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            if i == j {
                for k in 0..j {
                    sum += l[[j, k]] * l[[j, k]];
                }
                let diag = a[[j, j]] - sum;
                if diag <= SINGULAR_PIVOT_EPS * a[[j, j]].max(f64::MIN_POSITIVE) {
                    return Err(j);
                }
                l[[j, j]] = diag.sqrt();
            } else {
                for k in 0..j {
                    sum += l[[i, k]] * l[[j, k]];
                }
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L · y = b
    let mut y = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * y[j];
        }
        y[i] = (b[i] - sum) / l[[i, i]];
    }

    // Lᵀ · x = y
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (y[i] - sum) / l[[i, i]];
    }

    Ok(x)
}
