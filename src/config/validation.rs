//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (attempts >= 1, timeouts > 0)
//! - Check the backend URL is usable as a request base
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend.base_url '{url}' is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("probe.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("probe.timeout_ms must be greater than 0")]
    ZeroProbeTimeout,

    #[error("probe.expected_message must not be empty")]
    EmptySentinel,

    #[error("probe.base_delay_ms ({base}) exceeds probe.max_delay_ms ({max})")]
    DelayRange { base: u64, max: u64 },

    #[error("analyze.max_upload_bytes must be greater than 0")]
    ZeroUploadLimit,
}

/// Check every semantic rule and collect all violations.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.backend.base_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.backend.base_url.clone(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidBaseUrl {
            url: config.backend.base_url.clone(),
            reason: e.to_string(),
        }),
    }

    let probe = &config.probe;
    if probe.max_attempts == 0 {
        errors.push(ValidationError::ZeroAttempts);
    }
    if probe.timeout_ms == 0 {
        errors.push(ValidationError::ZeroProbeTimeout);
    }
    if probe.expected_message.is_empty() {
        errors.push(ValidationError::EmptySentinel);
    }
    if probe.base_delay_ms > probe.max_delay_ms {
        errors.push(ValidationError::DelayRange {
            base: probe.base_delay_ms,
            max: probe.max_delay_ms,
        });
    }

    if config.analyze.max_upload_bytes == 0 {
        errors.push(ValidationError::ZeroUploadLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
