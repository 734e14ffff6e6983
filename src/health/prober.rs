//! Startup wake-up prober.
//!
//! # Responsibilities
//! - Hit the backend's root route a bounded number of times
//! - Stop at the first body whose `message` matches the sentinel
//! - Log every failed attempt and give up quietly when the budget runs out

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::Instrument;

use crate::api::{ApiError, ApiResult, HealthStatus, InferenceClient};
use crate::config::ProbeConfig;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::timeouts::with_timeout;

/// Something that can answer a health probe.
pub trait ProbeTarget {
    fn health(&self) -> impl Future<Output = ApiResult<HealthStatus>> + Send;
}

impl ProbeTarget for InferenceClient {
    fn health(&self) -> impl Future<Output = ApiResult<HealthStatus>> + Send {
        InferenceClient::health(self)
    }
}

/// How a single probe attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Body carried the expected sentinel.
    Awake,
    /// Per-attempt deadline elapsed.
    TimedOut,
    /// Transport failure.
    Network(String),
    /// Body was not a JSON object.
    Malformed(String),
    /// Body parsed but `message` was absent or different.
    SentinelMismatch(Option<String>),
}

impl AttemptOutcome {
    pub fn is_awake(&self) -> bool {
        matches!(self, AttemptOutcome::Awake)
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Awake => "awake",
            AttemptOutcome::TimedOut => "timeout",
            AttemptOutcome::Network(_) => "network",
            AttemptOutcome::Malformed(_) => "malformed",
            AttemptOutcome::SentinelMismatch(_) => "mismatch",
        }
    }
}

impl fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptOutcome::Awake => write!(f, "backend awake"),
            AttemptOutcome::TimedOut => write!(f, "timed out"),
            AttemptOutcome::Network(e) => write!(f, "network error: {}", e),
            AttemptOutcome::Malformed(e) => write!(f, "malformed body: {}", e),
            AttemptOutcome::SentinelMismatch(Some(m)) => write!(f, "unexpected message {:?}", m),
            AttemptOutcome::SentinelMismatch(None) => write!(f, "no message field"),
        }
    }
}

/// Record of one probe request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    /// 1-based attempt number.
    pub ordinal: u32,
    pub timeout: Duration,
    pub outcome: AttemptOutcome,
    pub elapsed: Duration,
}

/// Everything a probe run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeReport {
    pub attempts: Vec<ProbeAttempt>,
    pub awake: bool,
}

/// Bounded wake-up loop against the backend's root route.
pub struct BackendProber<T = InferenceClient> {
    target: T,
    config: ProbeConfig,
}

impl<T: ProbeTarget> BackendProber<T> {
    pub fn new(target: T, config: ProbeConfig) -> Self {
        Self { target, config }
    }

    /// Run the loop to completion. Never fails; the report says what happened.
    pub async fn run(self) -> ProbeReport {
        if !self.config.enabled {
            tracing::info!("Backend probe disabled");
            return ProbeReport::default();
        }

        let max_attempts = self.config.max_attempts;
        let deadline = Duration::from_millis(self.config.timeout_ms);
        let mut attempts = Vec::with_capacity(max_attempts as usize);

        tracing::info!(max_attempts, timeout_ms = self.config.timeout_ms, "Waking backend");

        for ordinal in 1..=max_attempts {
            if ordinal > 1 {
                let pause = calculate_backoff(
                    ordinal - 1,
                    self.config.base_delay_ms,
                    self.config.max_delay_ms,
                );
                if !pause.is_zero() {
                    time::sleep(pause).await;
                }
            }

            let started = Instant::now();
            let outcome = match with_timeout(deadline, self.target.health()).await {
                Ok(Ok(status)) => self.classify(status),
                Ok(Err(ApiError::Malformed(e))) => AttemptOutcome::Malformed(e),
                Ok(Err(ApiError::Network(e))) => AttemptOutcome::Network(e),
                Ok(Err(e)) => AttemptOutcome::Network(e.to_string()),
                Err(_) => AttemptOutcome::TimedOut,
            };
            let elapsed = started.elapsed();
            metrics::record_probe_attempt(outcome.label(), elapsed);

            let awake = outcome.is_awake();
            match &outcome {
                AttemptOutcome::Awake => {
                    tracing::info!(attempt = ordinal, elapsed_ms = elapsed.as_millis() as u64, "Backend awake");
                }
                AttemptOutcome::SentinelMismatch(Some(message)) => {
                    tracing::warn!(
                        attempt = ordinal,
                        max_attempts,
                        message = %message,
                        expected = %self.config.expected_message,
                        "Backend answered with an unexpected message; check probe.expected_message"
                    );
                }
                other => {
                    tracing::warn!(
                        attempt = ordinal,
                        max_attempts,
                        outcome = other.label(),
                        error = %other,
                        "Attempt failed to wake backend"
                    );
                }
            }

            attempts.push(ProbeAttempt {
                ordinal,
                timeout: deadline,
                outcome,
                elapsed,
            });

            if awake {
                metrics::record_probe_run(true);
                return ProbeReport { attempts, awake: true };
            }
        }

        tracing::warn!(attempts = attempts.len(), "Backend did not wake up; giving up");
        metrics::record_probe_run(false);
        ProbeReport { attempts, awake: false }
    }

    fn classify(&self, status: HealthStatus) -> AttemptOutcome {
        match status.message {
            Some(message) if message == self.config.expected_message => AttemptOutcome::Awake,
            other => AttemptOutcome::SentinelMismatch(other),
        }
    }
}

impl<T> BackendProber<T>
where
    T: ProbeTarget + Send + Sync + 'static,
{
    /// Launch the loop in the background. Dropping the handle does not stop it.
    pub fn spawn(self) -> JoinHandle<ProbeReport> {
        tokio::spawn(self.run().instrument(tracing::info_span!("backend_probe")))
    }
}
