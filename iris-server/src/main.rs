//! Camera Iris Server
//!
//! Serves the web app from the public directory and proxies generation
//! requests under `/api/` to the configured media providers.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;
use tracing::{info, warn};

mod cli;
mod server_utils;

use cli::Cli;
use iris_core::modules::logger::init_logger;
use iris_core::proxy::{AxumServer, ServerStartConfig};
use iris_core::ConfigProvider;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(&cli.log_level).map_err(|e| anyhow!(e))?;

    let provider = Arc::new(ConfigProvider::from_process_env(&cli.config_dir));
    let snapshot = provider.reload().await;

    let start_config = ServerStartConfig::from_snapshot(
        &snapshot,
        cli.host,
        cli.port,
        cli.public_dir,
        cli.request_timeout,
    )?;

    if !start_config.public_dir.is_dir() {
        warn!(
            "Public directory {} does not exist; static requests will 404",
            start_config.public_dir.display()
        );
    }
    info!(
        "Config loaded from {} ({} origin(s) allowed, body limit {} bytes)",
        provider.config_dir().display(),
        snapshot.allowed_origins().len(),
        start_config.max_body_bytes
    );

    let server = AxumServer::new(start_config, provider);

    info!("Starting Camera Iris on {}", server.address());
    server.run(server_utils::shutdown_signal()).await?;
    Ok(())
}
