//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → CLI overrides (backend URL, probe budget)
//!     → ClientConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AnalyzeConfig, BackendConfig, ClientConfig, ObservabilityConfig, ProbeConfig,
    DEFAULT_PROBE_SENTINEL,
};
pub use validation::{validate_config, ValidationError};
