//! Meet Upload - command line front end for the results processing service.
//!
//! Commands:
//! - `meet-upload submit` - Fill in the meet form and submit a results file
//! - `meet-upload status` - Show whether the processing service is awake
//! - `meet-upload wake` - Wake the processing service

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use commands::{StatusArgs, SubmitArgs, WakeArgs};
use meet_client::ClientConfig;

/// Upload track meet results for processing
#[derive(Parser)]
#[command(name = "meet-upload")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Processing service base URL
    #[arg(long, global = true, env = "PROCESSING_API_URL")]
    api_url: Option<String>,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a results file with its meet details
    Submit(SubmitArgs),

    /// Show the processing service status
    Status(StatusArgs),

    /// Wake a sleeping processing service
    Wake(WakeArgs),
}

/// Filter directive: `RUST_LOG`, then `LOG_LEVEL`, then `info`
fn log_directive(rust_log: Option<String>, log_level: Option<String>) -> String {
    rust_log
        .filter(|v| !v.trim().is_empty())
        .or(log_level)
        .unwrap_or_else(|| "info".to_string())
}

/// Initialize logging. Runs before the config is loaded.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let directive = log_directive(std::env::var("RUST_LOG").ok(), std::env::var("LOG_LEVEL").ok());

    fmt()
        .with_env_filter(EnvFilter::new(directive))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenv::dotenv().ok();
    init_logging();

    let mut config = ClientConfig::load().context("Failed to load configuration")?;
    if let Some(api_url) = cli.api_url {
        config = config.with_api_url(api_url);
        config.validate().context("Invalid --api-url")?;
    }

    let output = output::Output::new(cli.json);

    let result = match cli.command {
        Commands::Submit(args) => commands::submit::run(args, &config, &output).await,
        Commands::Status(args) => commands::status::run(args, &config, &output).await,
        Commands::Wake(args) => commands::wake::run(args, &config, &output).await,
    };

    if let Err(e) = result {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
