//! Range Prediction Service - Main Entry Point

use api::{init_logging, run_server, ServiceConfig};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::load()?;
    init_logging(&config.log_level, config.json_logs)?;

    info!("=== Range Prediction Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!(
        "EV model: {}, HV model: {}",
        config.ev_model_path.display(),
        config.hv_model_path.display()
    );

    run_server(config).await
}
