//! Pause between wake-up attempts.

use rand::Rng;
use std::time::Duration;

/// Pause to take before the next probe attempt.
///
/// `completed` is how many attempts have already failed. The pause starts at
/// `base_ms`, doubles per failed attempt up to `max_ms`, and gets up to 10 %
/// of random slack on top.
/// No attempts yet, or a zero base, means no pause.
pub fn calculate_backoff(completed: u32, base_ms: u64, max_ms: u64) -> Duration {
    if completed == 0 || base_ms == 0 {
        return Duration::ZERO;
    }

    let doublings = (completed - 1).min(63);
    let pause_ms = base_ms
        .checked_shl(doublings)
        .filter(|ms| ms >> doublings == base_ms)
        .unwrap_or(u64::MAX)
        .min(max_ms);

    let slack_ms = match pause_ms / 10 {
        0 => 0,
        ceiling => rand::thread_rng().gen_range(0..ceiling),
    };
    Duration::from_millis(pause_ms.saturating_add(slack_ms))
}
