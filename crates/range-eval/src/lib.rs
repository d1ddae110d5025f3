//! Range Model Evaluation
//!
//! Loads a labelled CSV dataset, runs it through the batch preprocessing path
//! and a model artifact, and scores the predictions.

mod dataset;
mod metrics;

pub use dataset::{load_dataset, read_dataset, Dataset};
pub use metrics::{write_metrics_csv, EvalMetrics};

use std::path::Path;

use thiserror::Error;
use tracing::{info, warn};

use data_validator::VehicleClass;
use inference_engine::{InferenceError, RangeEstimator};

/// Errors during evaluation
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Target column '{0}' not found")]
    MissingTarget(&'static str),
    #[error("Row {row}: target value '{value}' is not a number")]
    InvalidTarget { row: usize, value: String },
    #[error("Dataset has no rows")]
    EmptyDataset,
    #[error("{targets} target(s) but {predictions} prediction(s)")]
    LengthMismatch { targets: usize, predictions: usize },
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// Evaluate the model at `model` on the dataset at `data`
pub fn evaluate(
    vehicle: VehicleClass,
    data: &Path,
    model: &Path,
    bucket_numeric_ambient: bool,
) -> Result<EvalMetrics, EvalError> {
    let estimator = RangeEstimator::load(vehicle, model)?;
    let dataset = load_dataset(data, vehicle, bucket_numeric_ambient)?;
    info!("[{}] Loaded {} row(s) from {}", vehicle, dataset.len(), data.display());
    if dataset.skipped > 0 {
        warn!("[{}] Skipped {} malformed row(s)", vehicle, dataset.skipped);
    }

    let (predictions, output) = estimator.estimate_batch(&dataset.records, true)?;
    if !output.report.is_exact() {
        info!(
            "[{}] Alignment zero-filled {:?}, dropped {:?}",
            vehicle, output.report.filled, output.report.dropped
        );
    }

    let metrics = EvalMetrics::compute(&dataset.targets, &predictions)?;
    info!(
        "[{}] RMSE: {:.2}, MAE: {:.2}, R2: {:.4}",
        vehicle, metrics.rmse, metrics.mae, metrics.r2
    );
    Ok(metrics)
}
