//! Caller-side deadlines.
//!
//! The executor has no clock of its own beyond its retry sleeps. A caller that
//! needs a hard upper bound wraps the whole call here; on expiry the pending
//! attempt or sleep is dropped.

use std::future::Future;
use std::time::Duration;

use crate::resilience::FetchError;

/// Run `call`, failing with `DeadlineExceeded` if it takes longer than `deadline`.
pub async fn with_deadline<F, T>(deadline: Duration, call: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(deadline = ?deadline, "Request deadline exceeded");
            Err(FetchError::DeadlineExceeded { deadline })
        }
    }
}
