use anyhow::{Context, Result};
use meet_server::config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Config warnings need a subscriber to land in
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    meet_server::init_logging(&log_level);

    let config = ServerConfig::load().context("Failed to load configuration")?;

    meet_server::run(config).await.context("Server error")?;

    Ok(())
}
