//! Derived run metrics
//!
//! Pure functions over a status snapshot. Callers recompute these on every
//! update instead of caching them, so a progress reset or jump never leaves a
//! stale value behind.

use std::time::Duration;

/// Linear estimate of the time left in a run
///
/// Assumes constant throughput since `elapsed` started counting:
/// `elapsed * (100 - progress) / progress`, rounded to whole seconds.
/// Returns `None` unless `0 < progress < 100`.
pub fn estimate_remaining(elapsed: Duration, progress: f64) -> Option<Duration> {
    if !(progress > 0.0 && progress < 100.0) {
        return None;
    }

    let seconds = elapsed.as_secs_f64() * (100.0 - progress) / progress;
    Some(Duration::from_secs(seconds.round() as u64))
}

/// Progress percentage with one decimal, e.g. `50.0%`
pub fn format_progress(progress: f64) -> String {
    format!("{:.1}%", progress)
}

/// Final score line shown once a run has finished
///
/// `Final Score: 87.5% (PASSED)`, or without the parenthesis when the
/// service sent no final status. `None` when there is no score.
pub fn format_final_score(overall_score: Option<f64>, final_status: Option<&str>) -> Option<String> {
    let score = overall_score?;
    Some(match final_status {
        Some(status) => format!("Final Score: {:.1}% ({})", score, status),
        None => format!("Final Score: {:.1}%", score),
    })
}

/// Compact human duration: `45s`, `3m 05s`, `1h 02m`
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
