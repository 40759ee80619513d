//! EMG stream bridge server
//!
//! Reads EMG samples from a USB serial device, classifies each against a
//! threshold and broadcasts the binary result to every connected
//! WebSocket client.
//!
//! Signal Flow: Serial EMG device → Threshold Classifier → Broadcast Hub
//! → WebSocket subscribers

mod cli;
mod ws;

use anyhow::Context;
use bridge_serial::SerialLink;
use bridge_stream::{spawn_acquisition, AcquisitionCommand, BroadcastHub, ReconnectBackoff};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = cli::Args::parse().into_config();
    config.validate().context("invalid configuration")?;

    let hub = Arc::new(BroadcastHub::new());
    let backoff = ReconnectBackoff::from_millis(
        config.serial.backoff_floor_ms,
        config.serial.backoff_cap_ms,
    );
    let link = SerialLink::new(config.serial.clone());
    let acquisition = spawn_acquisition(link, config.threshold, hub.clone(), backoff);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.listen_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind stream endpoint on {}", addr))?;

    // The bind address is all an external tunneling collaborator needs
    // to expose the endpoint publicly.
    info!(%addr, "stream endpoint bound, clients subscribe at ws://{}/ws", addr);

    let app = ws::router(hub.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    let _ = acquisition.send(AcquisitionCommand::Shutdown).await;
    hub.shutdown().await;
    info!("shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
