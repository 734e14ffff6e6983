//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap outbound calls with a deadline
//! - Cancel the call cleanly when the deadline passes
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities; dropping the future aborts the request
//! - Timeout errors are distinct from the call's own errors

use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// The deadline elapsed before the wrapped call finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deadline of {} ms elapsed", .0.as_millis())]
pub struct DeadlineExceeded(pub Duration);

/// Run `future` under `deadline`.
pub async fn with_timeout<F, T>(deadline: Duration, future: F) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(deadline, future)
        .await
        .map_err(|_| DeadlineExceeded(deadline))
}

/// Like [`with_timeout`], but a zero deadline means "no deadline".
pub async fn with_optional_timeout<F, T>(deadline: Duration, future: F) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    if deadline.is_zero() {
        Ok(future.await)
    } else {
        with_timeout(deadline, future).await
    }
}
