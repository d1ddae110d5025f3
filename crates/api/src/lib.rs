//! Range Prediction API Server
//!
//! HTTP endpoints for EV/HV range prediction and driving suggestions.

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod routes;

pub use crate::config::{ServiceConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};
pub use error::{ApiError, ErrorBody};
pub use routes::predict::{round_km, RangeResponse};
pub use routes::suggestions::SuggestionResponse;

use advisor::SuggestionEngine;
use data_validator::VehicleClass;
use inference_engine::RangeEstimator;

/// Application state shared across handlers
pub struct AppState {
    ev: RangeEstimator,
    hv: RangeEstimator,
    ev_advisor: SuggestionEngine,
    hv_advisor: SuggestionEngine,
    /// Per-request prediction deadline
    pub predict_timeout: Duration,
    /// Prometheus recorder, when installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

impl AppState {
    /// Create application state from loaded estimators
    pub fn new(ev: RangeEstimator, hv: RangeEstimator, predict_timeout: Duration) -> Self {
        Self {
            ev,
            hv,
            ev_advisor: SuggestionEngine::ev(),
            hv_advisor: SuggestionEngine::hv(),
            predict_timeout,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    /// Attach a Prometheus handle for `GET /metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Estimator of a vehicle class
    pub fn estimator(&self, vehicle: VehicleClass) -> &RangeEstimator {
        match vehicle {
            VehicleClass::Ev => &self.ev,
            VehicleClass::Hv => &self.hv,
        }
    }

    /// Suggestion engine of a vehicle class
    pub fn advisor(&self, vehicle: VehicleClass) -> &SuggestionEngine {
        match vehicle {
            VehicleClass::Ev => &self.ev_advisor,
            VehicleClass::Hv => &self.hv_advisor,
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub models: Vec<ModelStatus>,
}

/// Loaded model summary
#[derive(Debug, Serialize)]
pub struct ModelStatus {
    pub vehicle: VehicleClass,
    pub features: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/predict/ev", post(routes::predict::predict_ev))
        .route("/predict/hv", post(routes::predict::predict_hv))
        .route("/suggest/ev/suggestions", post(routes::suggestions::suggest_ev))
        .route("/suggest/hv/suggestions", post(routes::suggestions::suggest_hv))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let models = [VehicleClass::Ev, VehicleClass::Hv]
        .into_iter()
        .map(|vehicle| ModelStatus {
            vehicle,
            features: state.estimator(vehicle).pipeline().reference().width(),
        })
        .collect();

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        models,
    })
}

/// Prometheus exposition handler
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging. `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str, json: bool) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))
}

/// Install the Prometheus recorder
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Load both models and run the server until shutdown
pub async fn run_server(config: ServiceConfig) -> anyhow::Result<()> {
    let handle = init_metrics()?;

    let ev = RangeEstimator::load(VehicleClass::Ev, &config.ev_model_path)?;
    let hv = RangeEstimator::load(VehicleClass::Hv, &config.hv_model_path)?;

    let state = Arc::new(AppState::new(ev, hv, config.predict_timeout()).with_metrics(handle));
    let app = create_router(state, &config.cors_origins);

    info!("Starting API server on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
