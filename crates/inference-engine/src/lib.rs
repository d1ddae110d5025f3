//! Range Inference Engine
//!
//! Loads trained range models with tract-onnx (or a linear JSON artifact for
//! development) and runs them on aligned feature tables.

mod engine;
mod predictor;

pub use engine::RangeEstimator;
pub use predictor::{load_predictor, LinearModel, LinearPredictor, OnnxPredictor, Predictor};

use data_validator::ValidationError;
use thiserror::Error;

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Model load failed: {0}")]
    ModelLoadError(String),
    #[error("Inference failed: {0}")]
    InferenceFailed(String),
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: String, actual: String },
    #[error("Inference timeout after {0}ms")]
    Timeout(u64),
    #[error("Model returned an invalid prediction: {0}")]
    InvalidPrediction(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
