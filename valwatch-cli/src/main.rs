//! Valwatch CLI
//!
//! Command-line interface for following runs of the validation service.

mod commands;
mod config;
mod render;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "valwatch")]
#[command(about = "Follow validation runs from the terminal", long_about = None)]
struct Cli {
    /// Validation service URL
    #[arg(long, env = "VALWATCH_SERVER_URL", default_value = "http://localhost:8000")]
    server_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with progress output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "valwatch=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.server_url)?;
    debug!(
        "Loaded configuration: server_url={}, poll_interval={:?}",
        config.server_url, config.poller.poll_interval
    );

    handle_command(cli.command, &config).await
}
