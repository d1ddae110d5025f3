//! HTTP Error Mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use data_validator::{ValidationError, VehicleClass};
use inference_engine::InferenceError;

/// Error body, `{"detail": ...}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Request failure, already classified for the response
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not valid JSON or does not match the input record
    #[error("{0}")]
    Unprocessable(String),

    /// Categorical value outside its vocabulary
    #[error(transparent)]
    InvalidCategory(ValidationError),

    /// Any other failure while predicting
    #[error("{source}")]
    Internal {
        vehicle: VehicleClass,
        source: InferenceError,
    },
}

impl ApiError {
    /// Classify an inference failure for a vehicle class
    pub fn inference(vehicle: VehicleClass, error: InferenceError) -> Self {
        match error {
            InferenceError::Validation(e) => ApiError::InvalidCategory(e),
            source => ApiError::Internal { vehicle, source },
        }
    }

    /// HTTP status of this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidCategory(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing detail. EV hides internal failures, HV reports them.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Unprocessable(message) => message.clone(),
            ApiError::InvalidCategory(e) => e.to_string(),
            ApiError::Internal {
                vehicle: VehicleClass::Ev,
                ..
            } => "Internal Server Error".to_string(),
            ApiError::Internal {
                vehicle: VehicleClass::Hv,
                source,
            } => format!("Internal Server Error during prediction: {}", source),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Unprocessable(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody { detail: self.detail() })).into_response()
    }
}
