//! `boba-server` binary: loads configuration from the environment and serves
//! the order API.

use anyhow::Context;
use boba_server::config::ServerConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,boba=debug,sqlx=warn,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting Boba order server...");

    let config = ServerConfig::load().context("loading server configuration")?;
    info!(
        port = config.port,
        database = %config.database_path.display(),
        "Configuration loaded"
    );

    boba_server::serve(config).await
}
