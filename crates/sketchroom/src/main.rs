//! Sketchroom server binary.
//!
//! Reads configuration from the environment, serves until Ctrl+C.

use sketchroom::config::DEFAULT_LOG_FILTER;
use sketchroom::prelude::*;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), SketchError> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!(?config, "configuration loaded");

    let server = SketchServer::builder().config(&config).build().await?;
    info!(addr = %server.local_addr()?, "Sketchroom listening");

    server.run_until(shutdown_signal()).await?;
    info!("Sketchroom shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C. If the handler can't be installed, never resolves.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
}
