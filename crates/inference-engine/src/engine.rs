//! Range Estimator
//!
//! Binds one vehicle class's preprocessing pipeline to its loaded model.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use data_validator::{RawRecord, VehicleClass};
use feature_engine::{BatchOutput, PreprocessingPipeline};

use crate::predictor::{load_predictor, Predictor};
use crate::InferenceError;

/// Pipeline plus predictor for one vehicle class
#[derive(Clone)]
pub struct RangeEstimator {
    pipeline: PreprocessingPipeline,
    predictor: Arc<dyn Predictor>,
}

impl RangeEstimator {
    /// Pair a pipeline with an already-loaded predictor
    pub fn new(pipeline: PreprocessingPipeline, predictor: Arc<dyn Predictor>) -> Self {
        Self { pipeline, predictor }
    }

    /// Self-check the class's feature reference, then load its model artifact
    pub fn load(vehicle: VehicleClass, model_path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let pipeline = PreprocessingPipeline::for_class(vehicle);
        pipeline
            .self_check()
            .map_err(|e| InferenceError::ModelLoadError(e.to_string()))?;

        let predictor = load_predictor(model_path, pipeline.reference())?;
        info!(
            "[{}] Range estimator ready ({} features)",
            vehicle,
            pipeline.reference().width()
        );
        Ok(Self::new(pipeline, predictor))
    }

    /// Vehicle class
    pub fn vehicle(&self) -> VehicleClass {
        self.pipeline.vehicle()
    }

    /// Preprocessing pipeline
    pub fn pipeline(&self) -> &PreprocessingPipeline {
        &self.pipeline
    }

    /// Estimate the range of one record.
    ///
    /// Invalid categories fail before the model runs; an empty or non-finite
    /// model output is an [`InferenceError::InvalidPrediction`].
    pub fn estimate(&self, record: &RawRecord) -> Result<f64, InferenceError> {
        let start = Instant::now();
        let table = self.pipeline.process_record(record)?;
        let predictions = self.predictor.predict(&table)?;

        let value = match predictions.first() {
            Some(value) if value.is_finite() => *value,
            Some(value) => {
                return Err(InferenceError::InvalidPrediction(format!(
                    "non-finite estimate {}",
                    value
                )))
            }
            None => return Err(InferenceError::InvalidPrediction("empty result".to_string())),
        };

        debug!(
            "[{}] Estimated {:.2} km in {}us",
            self.vehicle(),
            value,
            start.elapsed().as_micros()
        );
        Ok(value)
    }

    /// Preprocess a batch in lenient mode and predict every row
    pub fn estimate_batch(
        &self,
        records: &[RawRecord],
        training: bool,
    ) -> Result<(Vec<f64>, BatchOutput), InferenceError> {
        let output = self.pipeline.process_batch(records, training);
        let predictions = self.predictor.predict(&output.table)?;
        if predictions.len() != output.table.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: format!("{} predictions", output.table.len()),
                actual: format!("{} predictions", predictions.len()),
            });
        }
        Ok((predictions, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_validator::ValidationError;
    use feature_engine::AlignedTable;

    struct FixedPredictor(f64);

    impl Predictor for FixedPredictor {
        fn predict(&self, table: &AlignedTable) -> Result<Vec<f64>, InferenceError> {
            Ok(vec![self.0; table.len()])
        }
    }

    struct SilentPredictor;

    impl Predictor for SilentPredictor {
        fn predict(&self, _table: &AlignedTable) -> Result<Vec<f64>, InferenceError> {
            Ok(Vec::new())
        }
    }

    fn hv_record() -> RawRecord {
        RawRecord::new()
            .with("hydrogen_percentage", 40.0)
            .with("ambient_temp", "Mild")
            .with("hvac_on", "no")
            .with("driving_mode", "eco")
            .with("drive_type", "FWD")
    }

    #[test]
    fn test_estimate_returns_model_value() {
        let estimator = RangeEstimator::new(PreprocessingPipeline::hv(), Arc::new(FixedPredictor(412.5)));
        assert_eq!(estimator.estimate(&hv_record()).unwrap(), 412.5);
    }

    #[test]
    fn test_non_finite_prediction_fails() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let estimator = RangeEstimator::new(PreprocessingPipeline::hv(), Arc::new(FixedPredictor(bad)));
            assert!(matches!(
                estimator.estimate(&hv_record()),
                Err(InferenceError::InvalidPrediction(_))
            ));
        }
    }

    #[test]
    fn test_empty_prediction_fails() {
        let estimator = RangeEstimator::new(PreprocessingPipeline::ev(), Arc::new(SilentPredictor));
        assert!(matches!(
            estimator.estimate(&RawRecord::new().with("ambient_temp", "cold")),
            Err(InferenceError::InvalidPrediction(_))
        ));
    }

    #[test]
    fn test_invalid_category_surfaces_as_validation_error() {
        let estimator = RangeEstimator::new(PreprocessingPipeline::hv(), Arc::new(FixedPredictor(1.0)));
        let mut record = hv_record();
        record.insert("ambient_temp", "freezing");

        match estimator.estimate(&record) {
            Err(InferenceError::Validation(ValidationError::InvalidCategory { field, .. })) => {
                assert_eq!(field, "ambient_temp")
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_batch_predicts_every_row() {
        let estimator = RangeEstimator::new(PreprocessingPipeline::hv(), Arc::new(FixedPredictor(300.0)));
        let mut bad = hv_record();
        bad.insert("hvac_on", "sometimes");

        let (predictions, output) = estimator.estimate_batch(&[hv_record(), bad], true).unwrap();
        assert_eq!(predictions, vec![300.0, 300.0]);
        assert_eq!(output.warnings.defaulted_rows("hvac_on"), 1);
    }

    #[test]
    fn test_batch_length_mismatch() {
        let estimator = RangeEstimator::new(PreprocessingPipeline::ev(), Arc::new(SilentPredictor));
        let record = RawRecord::new().with("ambient_temp", "hot");
        assert!(matches!(
            estimator.estimate_batch(&[record], false),
            Err(InferenceError::InvalidInputShape { .. })
        ));
    }
}
