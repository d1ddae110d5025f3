//! Model Artifacts
//!
//! A [`Predictor`] consumes an aligned feature table and returns one range
//! estimate per row, in row order. Artifacts are chosen by file extension.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tract_onnx::prelude::*;

use data_validator::VehicleClass;
use feature_engine::{AlignedTable, FeatureReference};

use crate::InferenceError;

/// Trained range regressor
pub trait Predictor: Send + Sync {
    /// One estimate per row of `table`, order-preserving
    fn predict(&self, table: &AlignedTable) -> Result<Vec<f64>, InferenceError>;
}

fn check_width(table: &AlignedTable, width: usize) -> Result<(), InferenceError> {
    if table.width() != width {
        return Err(InferenceError::InvalidInputShape {
            expected: format!("[n, {}]", width),
            actual: format!("[{}, {}]", table.len(), table.width()),
        });
    }
    Ok(())
}

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// ONNX model executed with tract
pub struct OnnxPredictor {
    plan: OnnxPlan,
    width: usize,
    path: PathBuf,
}

impl OnnxPredictor {
    /// Load and optimize an ONNX model for a `[1, width]` f32 input
    pub fn load(path: &Path, reference: &'static FeatureReference) -> Result<Self, InferenceError> {
        let width = reference.width();
        info!("Loading ONNX model {} ({} features)", path.display(), width);

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), tvec!(1, width)))
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;

        Ok(Self {
            plan,
            width,
            path: path.to_path_buf(),
        })
    }

    /// Artifact path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run_row(&self, row: &[f64]) -> Result<f64, InferenceError> {
        let values: Vec<f32> = row.iter().map(|v| *v as f32).collect();
        let input = Tensor::from_shape(&[1, self.width], values.as_slice())
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let output = outputs
            .first()
            .ok_or_else(|| InferenceError::InferenceFailed("model produced no outputs".to_string()))?;

        let output = output
            .cast_to::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;
        let flat = output
            .as_slice::<f32>()
            .map_err(|e| InferenceError::InferenceFailed(e.to_string()))?;

        match flat {
            [value] => Ok(f64::from(*value)),
            _ => Err(InferenceError::InvalidInputShape {
                expected: "1 output value per row".to_string(),
                actual: format!("{} values", flat.len()),
            }),
        }
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, table: &AlignedTable) -> Result<Vec<f64>, InferenceError> {
        check_width(table, self.width)?;
        table.rows().map(|row| self.run_row(row)).collect()
    }
}

/// Linear model artifact (`.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub vehicle: VehicleClass,
    pub intercept: f64,
    /// Weight per reference column; absent columns weigh 0
    pub coefficients: BTreeMap<String, f64>,
}

/// Linear regressor over the reference columns
#[derive(Debug, Clone)]
pub struct LinearPredictor {
    intercept: f64,
    weights: Vec<f64>,
}

impl LinearPredictor {
    /// Bind a linear model to a reference
    pub fn new(model: &LinearModel, reference: &'static FeatureReference) -> Result<Self, InferenceError> {
        if model.vehicle != reference.vehicle() {
            return Err(InferenceError::ModelLoadError(format!(
                "linear model is for '{}', expected '{}'",
                model.vehicle,
                reference.vehicle()
            )));
        }

        let mut weights = vec![0.0; reference.width()];
        for (column, weight) in &model.coefficients {
            let position = reference.position(column).ok_or_else(|| {
                InferenceError::ModelLoadError(format!(
                    "coefficient '{}' is not a {} feature",
                    column,
                    reference.vehicle()
                ))
            })?;
            weights[position] = *weight;
        }

        Ok(Self {
            intercept: model.intercept,
            weights,
        })
    }

    /// Read a `.json` linear model artifact
    pub fn load(path: &Path, reference: &'static FeatureReference) -> Result<Self, InferenceError> {
        info!("Loading linear model {}", path.display());
        let text = fs::read_to_string(path)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        let model: LinearModel = serde_json::from_str(&text)
            .map_err(|e| InferenceError::ModelLoadError(format!("{}: {}", path.display(), e)))?;
        Self::new(&model, reference)
    }
}

impl Predictor for LinearPredictor {
    fn predict(&self, table: &AlignedTable) -> Result<Vec<f64>, InferenceError> {
        check_width(table, self.weights.len())?;
        Ok(table
            .rows()
            .map(|row| {
                self.intercept + row.iter().zip(&self.weights).map(|(x, w)| x * w).sum::<f64>()
            })
            .collect())
    }
}

/// Load the artifact at `path` for `reference`, dispatching on extension
pub fn load_predictor(
    path: impl AsRef<Path>,
    reference: &'static FeatureReference,
) -> Result<Arc<dyn Predictor>, InferenceError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    debug!("[{}] Model artifact {}", reference.vehicle(), path.display());

    match extension.as_deref() {
        Some("onnx") => Ok(Arc::new(OnnxPredictor::load(path, reference)?)),
        Some("json") => Ok(Arc::new(LinearPredictor::load(path, reference)?)),
        _ => Err(InferenceError::ModelLoadError(format!(
            "unsupported model artifact: {}",
            path.display()
        ))),
    }
}
