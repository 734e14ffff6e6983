//! Metrics collection.
//!
//! # Metrics
//! - `lungai_probe_attempts_total` (counter): probe requests by outcome
//! - `lungai_probe_runs_total` (counter): finished probe loops by result
//! - `lungai_probe_attempt_duration_seconds` (histogram): per-attempt latency
//! - `lungai_analyses_total` (counter): prediction requests by outcome

use metrics::{counter, histogram};
use std::time::Duration;

/// Record one probe attempt.
pub fn record_probe_attempt(outcome: &'static str, elapsed: Duration) {
    counter!("lungai_probe_attempts_total", "outcome" => outcome).increment(1);
    histogram!("lungai_probe_attempt_duration_seconds").record(elapsed.as_secs_f64());
}

/// Record the end of a probe loop.
pub fn record_probe_run(awake: bool) {
    let result = if awake { "awake" } else { "exhausted" };
    counter!("lungai_probe_runs_total", "result" => result).increment(1);
}

/// Record a finished prediction request.
pub fn record_analysis(outcome: &'static str) {
    counter!("lungai_analyses_total", "outcome" => outcome).increment(1);
}
