//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Prober and analyze flow produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters through the `metrics` facade)
//!
//! Consumers:
//!     → stderr (human or JSON lines)
//!     → whatever recorder an embedding application installs
//! ```
//!
//! # Design Decisions
//! - Structured fields (attempt, outcome, request_id) instead of formatted text
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
