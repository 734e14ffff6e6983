//! Inference backend HTTP client.
//!
//! # Data Flow
//! ```text
//! health():  GET  <base>/         → HealthStatus { message }
//! predict(): POST <base>/predict  → multipart `file` → AnalysisResult (validated)
//!                                 → non-2xx: { "detail": ... } → ApiError::Status
//! ```
//!
//! # Design Decisions
//! - One `reqwest::Client` shared by prober and analyze flow (cheap to clone)
//! - Every request carries an `x-request-id` for correlation with backend logs
//! - Bodies are read as text first so error bodies and malformed bodies are told apart

pub mod client;
pub mod error;

pub use client::{HealthStatus, InferenceClient};
pub use error::{ApiError, ApiResult};
