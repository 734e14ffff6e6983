//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the client.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Exact `message` value the inference backend reports from its root route.
pub const DEFAULT_PROBE_SENTINEL: &str = "Lung Disease Detection API is running";

/// Root configuration for the LungAI client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ClientConfig {
    /// Inference backend location.
    pub backend: BackendConfig,

    /// Startup wake-up probe settings.
    pub probe: ProbeConfig,

    /// Upload/analyze settings.
    pub analyze: AnalyzeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Inference backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Root URL of the backend; `/` and `/predict` are resolved against it.
    pub base_url: String,

    /// User agent sent with every request.
    pub user_agent: String,

    /// Honour `HTTP(S)_PROXY` from the environment.
    pub use_system_proxy: bool,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://lung-disease-detection-wvi9.onrender.com/".to_string(),
            user_agent: concat!("lungai/", env!("CARGO_PKG_VERSION")).to_string(),
            use_system_proxy: true,
        }
    }
}

/// Wake-up probe configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Run the probe at startup.
    pub enabled: bool,

    /// Maximum number of probe requests.
    pub max_attempts: u32,

    /// Per-attempt deadline in milliseconds.
    pub timeout_ms: u64,

    /// `message` value that marks the backend as awake.
    pub expected_message: String,

    /// Base pause between attempts in milliseconds (0 = back-to-back).
    pub base_delay_ms: u64,

    /// Upper bound for the pause between attempts in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 4,
            timeout_ms: 20_000,
            expected_message: DEFAULT_PROBE_SENTINEL.to_string(),
            base_delay_ms: 0,
            max_delay_ms: 2_000,
        }
    }
}

/// Upload/analyze configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AnalyzeConfig {
    /// Client-side deadline for the prediction request (0 = none).
    pub timeout_ms: u64,

    /// Largest file accepted for selection.
    pub max_upload_bytes: u64,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 0,
            max_upload_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines instead of the human format.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
