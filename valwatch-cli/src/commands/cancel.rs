//! Cancel command handler

use anyhow::{Context, Result};
use colored::*;
use valwatch_client::ValidationClient;
use valwatch_core::domain::run::RunId;

use crate::config::Config;

/// Request cancellation of a run
///
/// The service only acknowledges the request; use `watch` or `status` to
/// see when the run actually stops.
pub async fn cancel_run(config: &Config, run_id: &str) -> Result<()> {
    let run_id = RunId::parse(run_id).context("Run ID must not be empty")?;

    let client = ValidationClient::new(config.server_url.clone());
    client
        .cancel(&run_id)
        .await
        .with_context(|| format!("Failed to cancel run {}", run_id))?;

    println!(
        "{} Cancellation of run {} requested",
        "✓".green(),
        run_id.to_string().cyan()
    );

    Ok(())
}
