//! Car Price Prediction Service - Main Entry Point

use std::path::PathBuf;

use api::{init_logging, run_server, ServiceConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ServiceConfig::load(config_path.as_deref())?;

    init_logging(&config.log_level);

    info!("=== Car Price Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Model artifact: {}", config.model_path.display());

    // An unloadable model is fatal: exit non-zero instead of serving
    if let Err(e) = run_server(config).await {
        error!("Service stopped: {}", e);
        return Err(e);
    }

    Ok(())
}
