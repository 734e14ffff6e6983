//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Probe attempt:
//!     → timeouts.rs (per-attempt deadline, drop = cancel)
//!     → On failure: backoff.rs (optional jittered pause before next attempt)
//! ```
//!
//! # Design Decisions
//! - Every probe request has a deadline
//! - Only the idempotent health GET is retried; the prediction POST never is

pub mod backoff;
pub mod timeouts;
