//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request from the data-access client:
//!     → executor.rs (attempt loop, attempt budget)
//!     → retries.rs (classify: success / retryable / terminal / transport error)
//!     → backoff.rs (Retry-After or doubled delay, plus jitter)
//!     → timeouts.rs (optional caller deadline around the whole call)
//! ```
//!
//! # Design Decisions
//! - Only 202, 429 and 503 are retried; other failures surface immediately
//! - Transport errors share the attempt budget with retryable statuses
//! - Server guidance (`Retry-After`) beats computed backoff
//! - Each call owns its counters; nothing is shared between calls

pub mod backoff;
pub mod executor;
pub mod retries;
pub mod timeouts;

use std::time::Duration;

use thiserror::Error;

use crate::net::TransportError;

pub use backoff::{parse_retry_after, with_jitter, Backoff, RetryAfter};
pub use executor::{RetryExecutor, RetryPolicy};
pub use retries::{classify, is_retryable_status, Outcome};
pub use timeouts::with_deadline;

/// Terminal failure of a resilient request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Every attempt in the budget hit a retryable status.
    #[error("Request failed after {max_retries} retries: {status_text}")]
    RetriesExhausted {
        max_retries: u32,
        status: u16,
        status_text: String,
    },

    /// A non-retryable, non-success status.
    #[error("Request failed with status {status}: {status_text}")]
    Status { status: u16, status_text: String },

    /// The last attempt failed below HTTP. Returned as-is, not wrapped into
    /// `RetriesExhausted`.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The loop ended without an attempt (a zero budget).
    #[error("Max retries reached without successful response.")]
    MaxRetriesReached,

    /// A caller-imposed deadline expired first.
    #[error("Request did not complete within {deadline:?}")]
    DeadlineExceeded { deadline: Duration },
}

impl FetchError {
    /// HTTP status behind this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::RetriesExhausted { status, .. } | FetchError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::RetriesExhausted { .. } => "retries_exhausted",
            FetchError::Status { .. } => "status",
            FetchError::Transport(_) => "transport",
            FetchError::MaxRetriesReached => "max_retries_reached",
            FetchError::DeadlineExceeded { .. } => "deadline",
        }
    }
}
