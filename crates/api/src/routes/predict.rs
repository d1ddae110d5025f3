//! Prediction Routes

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use data_validator::{EvInput, HvInput, RawRecord, VehicleClass};
use inference_engine::InferenceError;

use crate::error::ApiError;
use crate::AppState;

/// Response for the prediction endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct RangeResponse {
    pub predicted_range_km: f64,
}

/// Round half away from zero to 2 decimals
pub fn round_km(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Run one prediction under the configured deadline.
///
/// On timeout the request fails with 500, but the blocking task is abandoned
/// rather than cancelled and holds its blocking-pool thread until the model
/// call returns.
async fn predict(
    state: &AppState,
    vehicle: VehicleClass,
    record: RawRecord,
) -> Result<Json<RangeResponse>, ApiError> {
    debug!("[{}] Prediction request", vehicle);
    let estimator = state.estimator(vehicle).clone();
    let timeout = state.predict_timeout;
    let start = Instant::now();

    // Preprocessing and the model call are CPU-bound
    let task = tokio::task::spawn_blocking(move || estimator.estimate(&record));
    let result = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(InferenceError::InferenceFailed(join.to_string())),
        Err(_) => Err(InferenceError::Timeout(timeout.as_millis() as u64)),
    };

    let vehicle_label = vehicle.as_str();
    histogram!("range_prediction_latency_ms", "vehicle" => vehicle_label)
        .record(start.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok(value) => {
            counter!("range_predictions_total", "vehicle" => vehicle_label, "outcome" => "ok").increment(1);
            Ok(Json(RangeResponse {
                predicted_range_km: round_km(value),
            }))
        }
        Err(e) => {
            let err = ApiError::inference(vehicle, e);
            let outcome = prediction_outcome(&err);
            counter!("range_predictions_total", "vehicle" => vehicle_label, "outcome" => outcome).increment(1);
            match err {
                ApiError::InvalidCategory(_) => warn!("[{}] Rejected input: {}", vehicle, err),
                _ => error!("[{}] Prediction failed: {}", vehicle, err),
            }
            Err(err)
        }
    }
}

/// `outcome` label of a failed prediction
fn prediction_outcome(err: &ApiError) -> &'static str {
    match err {
        ApiError::InvalidCategory(_) => "invalid_input",
        _ => "error",
    }
}

/// `POST /predict/ev`
pub async fn predict_ev(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EvInput>, JsonRejection>,
) -> Result<Json<RangeResponse>, ApiError> {
    let Json(input) = payload?;
    predict(&state, VehicleClass::Ev, RawRecord::from(&input)).await
}

/// `POST /predict/hv`
pub async fn predict_hv(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HvInput>, JsonRejection>,
) -> Result<Json<RangeResponse>, ApiError> {
    let Json(input) = payload?;
    predict(&state, VehicleClass::Hv, RawRecord::from(&input)).await
}
