//! # Intake Node
//!
//! Entry point: configuration, logging, then serve until Ctrl+C.

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime};
use rpc_telemetry::init_logging;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("invalid configuration")?;
    init_logging(&config.telemetry).context("failed to initialize logging")?;

    info!(service = %config.telemetry.service_name, "Loaded configuration");

    let runtime = NodeRuntime::new(config)?;
    runtime.run(shutdown_signal()).await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => warn!(error = %e, "Ctrl+C handler failed, shutting down"),
    }
}
