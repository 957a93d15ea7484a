//! Watch command handler
//!
//! Follows a run with the progress poller, printing every published state
//! until the run finishes, the connection is lost, or the user interrupts.

use anyhow::Result;
use colored::*;
use std::sync::Arc;
use valwatch_client::ValidationClient;
use valwatch_core::domain::step;
use valwatch_monitor::state::NO_RUN_IN_PROGRESS;
use valwatch_monitor::{PollExit, ProgressPoller};

use crate::config::{Config, PollerOverrides};
use crate::render;

/// Watch a run until it stops
pub async fn watch_run(
    config: &Config,
    run_id: &str,
    overrides: &PollerOverrides,
    cancel_on_interrupt: bool,
) -> Result<()> {
    let poller_config = config.poller_with(overrides)?;
    let client = Arc::new(ValidationClient::new(config.server_url.clone()));
    let poller = ProgressPoller::new(client, poller_config);

    let Some(handle) = poller.start(run_id, |status| render::print_completion(&status)) else {
        println!("{}", NO_RUN_IN_PROGRESS.yellow());
        return Ok(());
    };

    println!(
        "{}",
        format!("Watching run {} on {}", handle.run_id(), config.server_url).bold()
    );
    println!();

    let mut updates = handle.subscribe();
    let mut last_step = None;
    let mut cancel_requested = false;
    let mut detached = false;

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if !state.has_snapshot() && state.error.is_none() {
                    continue;
                }

                let current_step = step::current_step_index(state.progress);
                if state.has_snapshot() && current_step != last_step {
                    render::print_steps(state.progress);
                    last_step = current_step;
                }
                render::print_state(&state);
            }
            _ = tokio::signal::ctrl_c() => {
                if cancel_on_interrupt && !cancel_requested && handle.state().can_cancel() {
                    cancel_requested = true;
                    match handle.cancel().await {
                        Ok(()) => println!("{}", "Cancellation requested".yellow()),
                        Err(e) => println!("{}", format!("Cancel failed: {}", e).red()),
                    }
                } else {
                    detached = true;
                    break;
                }
            }
        }
    }

    if detached {
        handle.stop().await;
        println!("{}", "Stopped watching (the run continues on the server)".dimmed());
        return Ok(());
    }

    match handle.wait().await? {
        PollExit::Terminal(_) => Ok(()),
        PollExit::ServerCancelled(_) => {
            println!("{}", "Run was cancelled".yellow());
            Ok(())
        }
        PollExit::ConnectionLost => {
            anyhow::bail!("Lost connection to the validation service at {}", config.server_url)
        }
    }
}
