//! Backend availability probing.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     spawn(BackendProber)
//!     → attempt 1..=max_attempts:
//!         GET <base>/ under per-attempt deadline
//!         → body.message == sentinel ? stop : log + next attempt
//!     → ProbeReport (awake | exhausted), never an error
//! ```
//!
//! # Design Decisions
//! - Fire-and-forget: nothing waits on the report, the analyze flow never blocks on it
//! - The prober consumes itself, so one instance can only run once
//! - A `message` that is present but differs from the sentinel is logged on its own,
//!   so a backend wording change shows up in the logs instead of as silent retries

pub mod prober;

pub use prober::{AttemptOutcome, BackendProber, ProbeAttempt, ProbeReport, ProbeTarget};
