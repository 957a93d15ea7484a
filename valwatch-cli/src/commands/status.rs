//! Status command handler

use anyhow::{Context, Result};
use colored::*;
use valwatch_client::ValidationClient;
use valwatch_core::domain::run::RunId;
use valwatch_monitor::state::NO_RUN_IN_PROGRESS;

use crate::config::Config;
use crate::render;

/// Fetch and display the current status of a run
pub async fn show_status(config: &Config, run_id: &str) -> Result<()> {
    let Some(run_id) = RunId::parse(run_id) else {
        println!("{}", NO_RUN_IN_PROGRESS.yellow());
        return Ok(());
    };

    let client = ValidationClient::new(config.server_url.clone());
    let status = client
        .get_progress(&run_id)
        .await
        .with_context(|| format!("Failed to fetch progress of run {}", run_id))?;

    render::print_snapshot(&status);

    Ok(())
}
