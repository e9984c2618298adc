//!
//! Meet Server - local passthrough for the results parser
//!
//! Accepts the same multipart upload the hosted processing service does,
//! stages the file, runs the parser script on it and relays the script's JSON.

use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;

/// API module
pub mod api;

/// Configuration module
pub mod config;

/// Error module
pub mod error;

/// Parser script runner
pub mod script;

// Re-export key types
pub use api::{build_router, AppState};
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use script::{MeetMetadata, ProcessScriptRunner, ScriptOutput, ScriptRunner};

/// Run function
pub async fn run(config: ServerConfig) -> ServerResult<()> {
    init_logging(&config.log_level);

    std::fs::create_dir_all(&config.upload_dir)?;
    let app = build_router(AppState::from_config(&config));

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| {
            ServerError::ConfigError(format!(
                "Invalid bind address {}:{}: {}",
                config.bind_address, config.port, e
            ))
        })?;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging. `RUST_LOG` wins over `log_level`.
pub fn init_logging(log_level: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    // A subscriber may already be installed when embedded
    let _ = fmt().with_env_filter(filter).with_target(true).try_init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
