//! Suggestion Routes

use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use data_validator::{EvInput, HvInput, RawRecord, VehicleClass};

use crate::error::ApiError;
use crate::AppState;

/// Response for the suggestion endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<String>,
}

fn suggest(state: &AppState, vehicle: VehicleClass, record: &RawRecord) -> Json<SuggestionResponse> {
    let suggestions = state.advisor(vehicle).suggest(record);
    debug!("[{}] {} suggestion(s)", vehicle, suggestions.len());
    Json(SuggestionResponse { suggestions })
}

/// `POST /suggest/ev/suggestions`
pub async fn suggest_ev(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EvInput>, JsonRejection>,
) -> Result<Json<SuggestionResponse>, ApiError> {
    let Json(input) = payload?;
    Ok(suggest(&state, VehicleClass::Ev, &RawRecord::from(&input)))
}

/// `POST /suggest/hv/suggestions`
pub async fn suggest_hv(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<HvInput>, JsonRejection>,
) -> Result<Json<SuggestionResponse>, ApiError> {
    let Json(input) = payload?;
    Ok(suggest(&state, VehicleClass::Hv, &RawRecord::from(&input)))
}
