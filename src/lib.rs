//! LungAI client library.
//!
//! Talks to the LungAI inference backend: a startup wake-up prober for the
//! cold-starting host, and the upload/analyze session that turns a chest
//! X-ray into rendered multi-label findings.

pub mod analysis;
pub mod api;
pub mod config;
pub mod health;
pub mod observability;
pub mod render;
pub mod resilience;
pub mod session;

pub use analysis::AnalysisResult;
pub use api::{ApiError, InferenceClient};
pub use config::ClientConfig;
pub use health::{BackendProber, ProbeReport};
pub use session::{AnalysisSession, PreviewStore, SelectedImage};
