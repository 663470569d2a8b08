//! Retry classification.
//!
//! # Decision Table
//! ```text
//! 202 Accepted / 429 Too Many Requests / 503 Service Unavailable → RetryableStatus
//! any other 2xx                                                  → Success
//! any other status                                               → TerminalStatus
//! no response (connect, DNS, reset)                              → TransportError
//! ```
//!
//! 202 is listed before the generic 2xx rule: the server accepted the request
//! but has not produced the result yet.

use reqwest::StatusCode;

use crate::net::{HttpResponse, TransportError};

/// Result of one attempt, classified for the retry loop.
#[derive(Debug)]
pub enum Outcome {
    Success(HttpResponse),
    RetryableStatus(HttpResponse),
    TerminalStatus(HttpResponse),
    TransportError(TransportError),
}

impl Outcome {
    /// Whether the loop may spend another attempt on this outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Outcome::RetryableStatus(_) | Outcome::TransportError(_))
    }
}

/// Statuses that signal transient unavailability.
pub fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::ACCEPTED | StatusCode::TOO_MANY_REQUESTS | StatusCode::SERVICE_UNAVAILABLE
    )
}

/// Classify the result of a single transport call.
pub fn classify(result: Result<HttpResponse, TransportError>) -> Outcome {
    match result {
        Ok(response) if is_retryable_status(response.status) => Outcome::RetryableStatus(response),
        Ok(response) if response.ok() => Outcome::Success(response),
        Ok(response) => Outcome::TerminalStatus(response),
        Err(e) => Outcome::TransportError(e),
    }
}
