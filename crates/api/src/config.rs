//! Service Configuration
//!
//! Built-in defaults, then an optional TOML file, then `RANGE_SERVICE__*`
//! environment variables.

use std::path::PathBuf;
use std::time::Duration;

use ::config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// Default configuration file, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config/range-service.toml";

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "RANGE_SERVICE_CONFIG";

const ENV_PREFIX: &str = "RANGE_SERVICE";

/// Range service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address
    pub bind_addr: String,
    /// EV model artifact (`.onnx` or `.json`)
    pub ev_model_path: PathBuf,
    /// HV model artifact (`.onnx` or `.json`)
    pub hv_model_path: PathBuf,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
    /// Per-request prediction deadline
    pub predict_timeout_ms: u64,
    /// Default log filter when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            ev_model_path: PathBuf::from("models/ev_model.onnx"),
            hv_model_path: PathBuf::from("models/hv_model.onnx"),
            cors_origins: vec!["http://localhost:5173".to_string()],
            predict_timeout_ms: 2000,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl ServiceConfig {
    /// Load from the default file location (or `RANGE_SERVICE_CONFIG`) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path, Environment::with_prefix(ENV_PREFIX).separator("__"))
    }

    /// Load from an explicit file (optional) and environment source
    pub fn load_from(path: &str, environment: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                environment
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_origins"),
            )
            .build()?
            .try_deserialize()
    }

    /// Prediction deadline
    pub fn predict_timeout(&self) -> Duration {
        Duration::from_millis(self.predict_timeout_ms)
    }
}
