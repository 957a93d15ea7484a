//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod cancel;
mod status;
mod watch;

use anyhow::Result;
use clap::Subcommand;

use crate::config::{Config, PollerOverrides};

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Follow a run until it finishes
    Watch {
        /// Run ID
        run_id: String,

        /// Poll interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Consecutive fetch failures before giving up (0 retries forever)
        #[arg(long)]
        max_failures: Option<u32>,

        /// Never show progress going backwards
        #[arg(long)]
        clamp_progress: bool,

        /// Request cancellation of the run on Ctrl-C instead of just detaching
        #[arg(long)]
        cancel_on_interrupt: bool,
    },
    /// Show the current status of a run
    Status {
        /// Run ID
        run_id: String,
    },
    /// Request cancellation of a run
    Cancel {
        /// Run ID
        run_id: String,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Watch {
            run_id,
            interval_ms,
            max_failures,
            clamp_progress,
            cancel_on_interrupt,
        } => {
            let overrides = PollerOverrides {
                interval_ms,
                max_failures,
                clamp_progress,
            };
            watch::watch_run(config, &run_id, &overrides, cancel_on_interrupt).await
        }
        Commands::Status { run_id } => status::show_status(config, &run_id).await,
        Commands::Cancel { run_id } => cancel::cancel_run(config, &run_id).await,
    }
}
