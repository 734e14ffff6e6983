//! Upload/analyze session.
//!
//! # State Machine
//! ```text
//! Idle ──select(image/*)──▶ FileSelected ──analyze──▶ Loading ──ok──▶ Results
//!   ▲                          │  ▲                      │
//!   │                          └──┘ select (replace)     └──err──▶ Error ──analyze──▶ Loading
//!   └──────────────────── reset (any state)
//!
//! Loading ──dropped/cancelled──▶ FileSelected
//! ```
//!
//! # Design Decisions
//! - Non-image selections are ignored, never surfaced as errors
//! - Preview handles are RAII: dropping the owning state releases them
//! - No retries at this layer; the user re-triggers analysis
//! - An abandoned request never strands the session in Loading

pub mod image;
pub mod preview;
pub mod state;

pub use image::{media_type_for_path, SelectedImage};
pub use preview::{PreviewHandle, PreviewStore};
pub use state::{
    AnalysisSession, ErrorView, IgnoreReason, Selection, SessionError, SessionPhase,
    MODEL_MISSING_MARKER, SETUP_HINT,
};
