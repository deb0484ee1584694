//! Holdout Evaluation Metrics

use serde::{Deserialize, Serialize};

/// Regression quality on a set of labelled rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Coefficient of determination
    pub r_squared: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Number of rows evaluated
    pub n_samples: usize,
}

impl EvaluationMetrics {
    /// Compare predictions against targets. Returns `None` for empty or mismatched input.
    pub fn compute(predictions: &[f64], targets: &[f64]) -> Option<Self> {
        if predictions.is_empty() || predictions.len() != targets.len() {
            return None;
        }

        let n = targets.len() as f64;
        let mean = targets.iter().sum::<f64>() / n;

        let mut abs_sum = 0.0;
        let mut ss_res = 0.0;
        let mut ss_tot = 0.0;
        for (p, t) in predictions.iter().zip(targets) {
            let err = t - p;
            abs_sum += err.abs();
            ss_res += err * err;
            ss_tot += (t - mean) * (t - mean);
        }

        let r_squared = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Some(Self {
            r_squared,
            mae: abs_sum / n,
            rmse: (ss_res / n).sqrt(),
            n_samples: targets.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = [1.0, 2.0, 3.0];
        let metrics = EvaluationMetrics::compute(&y, &y).unwrap();
        assert_eq!(metrics.r_squared, 1.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.rmse, 0.0);
    }

    #[test]
    fn test_errors() {
        let metrics = EvaluationMetrics::compute(&[2.0, 2.0], &[1.0, 3.0]).unwrap();
        assert!((metrics.mae - 1.0).abs() < 1e-12);
        assert!((metrics.rmse - 1.0).abs() < 1e-12);
        assert!((metrics.r_squared - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty() {
        assert!(EvaluationMetrics::compute(&[], &[]).is_none());
        assert!(EvaluationMetrics::compute(&[1.0], &[1.0, 2.0]).is_none());
    }
}
