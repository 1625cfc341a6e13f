//! CT Node entry point.

use anyhow::{Context, Result};
use ct_node::{NodeConfig, NodeRuntime};
use ct_telemetry::{init_tracing, TelemetryConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_tracing(&telemetry).context("failed to initialize tracing")?;

    let config = NodeConfig::from_env().context("invalid node configuration")?;
    let mut runtime = NodeRuntime::new(config)?;
    runtime.start();

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl+C")?;

    runtime.shutdown().await;
    Ok(())
}
