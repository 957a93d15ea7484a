//! Terminal rendering of run progress

use colored::*;
use tokio::time::Instant;
use valwatch_core::domain::run::{JobStatus, RunState};
use valwatch_core::domain::step::{self, StepState};
use valwatch_core::metrics::{self, format_duration, format_progress};
use valwatch_monitor::{ConnectionState, PollerState};

const BAR_WIDTH: usize = 30;

/// Print one line for a published poller state
pub fn print_state(state: &PollerState) {
    let elapsed = state.elapsed(Instant::now());

    let mut line = format!(
        "{} {} {}",
        format!("[{:>6}]", format_progress(state.progress)).bold(),
        progress_bar(state.progress).cyan(),
        colorize_status(state.status)
    );
    if !state.current_step.is_empty() {
        line.push_str(&format!("  {}", state.current_step));
    }
    line.push_str(&format!("  {}", timing(elapsed, state.estimated_remaining).dimmed()));
    if let Some(checks) = checks(state.detailed.current_check, state.detailed.total_checks) {
        line.push_str(&format!("  {}", checks.dimmed()));
    }
    println!("{}", line);

    match state.connection {
        ConnectionState::Retrying { failures } => {
            println!("  {} retrying ({} failed in a row)", "⚠".yellow(), failures)
        }
        ConnectionState::Lost => println!("  {}", "✗ Connection lost".red()),
        ConnectionState::Connected => {}
    }

    if let Some(error) = &state.error {
        println!("  {}", error.red());
    }
}

/// Print the phase list for a progress value
pub fn print_steps(progress: f64) {
    for (step, state) in step::step_states(progress) {
        let line = format!("{} {}", step_marker(state), step.label());
        let line = match state {
            StepState::Completed => line.green(),
            StepState::Current => line.cyan().bold(),
            StepState::Pending => line.dimmed(),
        };
        println!("  {}", line);
    }
}

/// Print a one-shot status snapshot
pub fn print_snapshot(status: &JobStatus) {
    println!("{}", "Run Status:".bold());
    println!("  Status:   {}", colorize_status(status.status));
    println!(
        "  Progress: {} {}",
        format_progress(status.progress),
        progress_bar(status.progress).cyan()
    );
    if !status.current_step.is_empty() {
        println!("  Step:     {}", status.current_step);
    }
    if let Some(checks) = checks(status.current_check, status.total_checks) {
        println!("  Checks:   {}", checks);
    }
    if let Some(error) = &status.error {
        println!("  Error:    {}", error.red());
    }
    if let Some(line) =
        metrics::format_final_score(status.overall_score, status.final_status.as_deref())
    {
        println!("  {}", line.bold());
    }

    println!("\n{}", "Phases:".bold());
    print_steps(status.progress);
}

/// Print the summary of a finished run
pub fn print_completion(status: &JobStatus) {
    println!();
    println!(
        "{} Run finished: {}",
        if status.status == RunState::Completed {
            "✓".green()
        } else {
            "✗".red()
        },
        colorize_status(status.status)
    );
    if let Some(line) =
        metrics::format_final_score(status.overall_score, status.final_status.as_deref())
    {
        println!("  {}", line.bold());
    }
    if let Some(error) = &status.error {
        println!("  {}", error.red());
    }
}

fn colorize_status(status: RunState) -> ColoredString {
    let status_str = status.as_str();
    match status {
        RunState::Running => status_str.cyan(),
        RunState::Completed => status_str.green(),
        RunState::Failed => status_str.red(),
        RunState::Error => status_str.red(),
        RunState::Cancelled => status_str.dimmed(),
    }
}

fn progress_bar(progress: f64) -> String {
    let ratio = (progress / 100.0).clamp(0.0, 1.0);
    let filled = ((ratio * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn step_marker(state: StepState) -> &'static str {
    match state {
        StepState::Completed => "✓",
        StepState::Current => "▸",
        StepState::Pending => "·",
    }
}

fn timing(elapsed: std::time::Duration, remaining: Option<std::time::Duration>) -> String {
    match remaining {
        Some(remaining) => format!(
            "elapsed {}, ~{} left",
            format_duration(elapsed),
            format_duration(remaining)
        ),
        None => format!("elapsed {}", format_duration(elapsed)),
    }
}

fn checks(current: Option<u32>, total: Option<u32>) -> Option<String> {
    match (current, total) {
        (Some(current), Some(total)) => Some(format!("check {}/{}", current, total)),
        (Some(current), None) => Some(format!("check {}", current)),
        _ => None,
    }
}
