//! Error taxonomy for backend calls.

use thiserror::Error;

/// Fallback text when a failed response carries no usable `detail`.
pub const ANALYSIS_FAILED: &str = "Analysis failed";

/// Text shown for bodies that do not match the expected shape.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

/// Errors that can occur while talking to the inference backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Configured base URL cannot be used.
    #[error("invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection, TLS or transport failure.
    #[error("network error: {0}")]
    Network(String),

    /// Client-side deadline elapsed.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// Backend answered with a non-success status.
    #[error("backend returned status {status}")]
    Status { status: u16, detail: Option<String> },

    /// Body could not be parsed or broke a structural rule.
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Result type for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Message suitable for the analysis error view.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Status { detail: Some(detail), .. } => detail.clone(),
            ApiError::Status { detail: None, .. } => ANALYSIS_FAILED.to_string(),
            ApiError::Network(message) => message.clone(),
            ApiError::Timeout(ms) => format!("Request timed out after {} ms", ms),
            ApiError::InvalidUrl { .. } => self.to_string(),
            ApiError::Malformed(_) => UNEXPECTED_ERROR.to_string(),
        }
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::InvalidUrl { .. } => "invalid_url",
            ApiError::Network(_) => "network",
            ApiError::Timeout(_) => "timeout",
            ApiError::Status { .. } => "status",
            ApiError::Malformed(_) => "malformed",
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        let message = error_chain(&e);
        if e.is_decode() {
            ApiError::Malformed(message)
        } else {
            ApiError::Network(message)
        }
    }
}

/// Join an error and its `source()` chain with `": "`, skipping repeated links.
fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut last = message.clone();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !text.is_empty() && !last.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        last = text;
        source = cause.source();
    }
    message
}
