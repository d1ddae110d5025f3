//! Regression Metrics

use std::path::Path;

use crate::EvalError;

/// Scores of one evaluation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvalMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
}

impl EvalMetrics {
    /// Score `predictions` against `targets` (same length, non-empty).
    ///
    /// For a constant target R² is 1.0 when every prediction is exact and 0.0 otherwise.
    pub fn compute(targets: &[f64], predictions: &[f64]) -> Result<Self, EvalError> {
        if targets.len() != predictions.len() {
            return Err(EvalError::LengthMismatch {
                targets: targets.len(),
                predictions: predictions.len(),
            });
        }
        if targets.is_empty() {
            return Err(EvalError::EmptyDataset);
        }
        let n = targets.len() as f64;

        let mut squared = 0.0;
        let mut absolute = 0.0;
        for (target, prediction) in targets.iter().zip(predictions) {
            let residual = target - prediction;
            squared += residual * residual;
            absolute += residual.abs();
        }

        let mean = targets.iter().sum::<f64>() / n;
        let total: f64 = targets.iter().map(|t| (t - mean) * (t - mean)).sum();
        let r2 = if total == 0.0 {
            if squared == 0.0 {
                1.0
            } else {
                0.0
            }
        } else {
            1.0 - squared / total
        };

        Ok(Self {
            rmse: (squared / n).sqrt(),
            mae: absolute / n,
            r2,
        })
    }
}

/// Write `metric,value` rows (RMSE, MAE, R2)
pub fn write_metrics_csv(path: &Path, metrics: &EvalMetrics) -> Result<(), EvalError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["metric", "value"])?;
    for (name, value) in [("RMSE", metrics.rmse), ("MAE", metrics.mae), ("R2", metrics.r2)] {
        writer.write_record([name, value.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
