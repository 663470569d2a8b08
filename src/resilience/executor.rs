//! Resilient request executor.
//!
//! Runs one logical request to completion over any [`Transport`], retrying
//! transient failures within a fixed attempt budget.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::net::{HttpResponse, RequestOptions, Transport};
use crate::observability::metrics;
use crate::resilience::backoff::{parse_retry_after, with_jitter, Backoff};
use crate::resilience::retries::{classify, Outcome};
use crate::resilience::FetchError;

/// Retry settings for an executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempt budget; also the number of transport calls in the worst case.
    pub max_retries: u32,
    /// Backoff seed. Also the floor used when `Retry-After` is in the past.
    pub initial_delay: Duration,
    /// Exclusive upper bound of the jitter added to every delay.
    pub max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            max_jitter: Duration::from_millis(config.max_jitter_ms),
        }
    }
}

/// Executes requests with retries, backoff and jitter.
#[derive(Debug, Clone)]
pub struct RetryExecutor<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryExecutor<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute with the policy's attempt budget.
    pub async fn execute(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, FetchError> {
        self.execute_with_retries(url, options, self.policy.max_retries)
            .await
    }

    /// Execute with an explicit attempt budget.
    ///
    /// Returns the first 2xx response that is not 202. A terminal status fails
    /// at once. Retryable statuses and transport errors are retried until
    /// `max_retries` attempts have been made.
    pub async fn execute_with_retries(
        &self,
        url: &str,
        options: &RequestOptions,
        max_retries: u32,
    ) -> Result<HttpResponse, FetchError> {
        let mut attempt: u32 = 0;
        let mut backoff = Backoff::new(self.policy.initial_delay);

        while attempt < max_retries {
            let result = self.transport.send(url, options).await;

            let hint = match classify(result) {
                Outcome::Success(response) => return Ok(response),
                Outcome::TerminalStatus(response) => {
                    tracing::debug!(url = %url, status = %response.status, "Non-retryable response");
                    return Err(FetchError::Status {
                        status: response.status.as_u16(),
                        status_text: response.status_text().to_string(),
                    });
                }
                Outcome::RetryableStatus(response) => {
                    attempt += 1;
                    if attempt >= max_retries {
                        return Err(FetchError::RetriesExhausted {
                            max_retries,
                            status: response.status.as_u16(),
                            status_text: response.status_text().to_string(),
                        });
                    }
                    metrics::record_retry("status");
                    response.retry_after().map(parse_retry_after)
                }
                Outcome::TransportError(e) => {
                    attempt += 1;
                    if attempt >= max_retries {
                        return Err(FetchError::Transport(e));
                    }
                    metrics::record_retry("transport");
                    tracing::warn!(url = %url, error = %e, "Network error");
                    None
                }
            };

            let delay = with_jitter(backoff.next_delay(hint), self.policy.max_jitter);
            tracing::warn!(
                url = %url,
                delay_secs = delay.as_secs_f64(),
                attempt,
                max_retries,
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
        }

        Err(FetchError::MaxRetriesReached)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::TransportError;
    use reqwest::header::{HeaderMap, HeaderValue, RETRY_AFTER};
    use reqwest::StatusCode;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;
    use tokio::time::Instant;

    type Step = Result<HttpResponse, TransportError>;

    /// Plays back a fixed list of results, then repeats `fallback`.
    struct ScriptedTransport {
        script: Mutex<VecDeque<Step>>,
        fallback: u16,
        calls: AtomicU32,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Step>, fallback: u16) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Transport for ScriptedTransport {
        async fn send(&self, _url: &str, _options: &RequestOptions) -> Step {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| respond(self.fallback, None, ""))
        }
    }

    fn respond(status: u16, retry_after: Option<&'static str>, body: &str) -> Step {
        let mut headers = HeaderMap::new();
        if let Some(value) = retry_after {
            headers.insert(RETRY_AFTER, HeaderValue::from_static(value));
        }
        Ok(HttpResponse::new(
            StatusCode::from_u16(status).unwrap(),
            headers,
            body.as_bytes().to_vec(),
        ))
    }

    fn refused() -> Step {
        Err(TransportError::Connect("connection refused".into()))
    }

    fn executor(script: Vec<Step>, fallback: u16, jitter_ms: u64) -> RetryExecutor<ScriptedTransport> {
        let policy = RetryPolicy {
            max_retries: 3,
            initial_delay: Duration::from_millis(1000),
            max_jitter: Duration::from_millis(jitter_ms),
        };
        RetryExecutor::new(ScriptedTransport::new(script, fallback), policy)
    }

    fn assert_elapsed(start: Instant, min_ms: u64, max_ms: u64) {
        let elapsed = start.elapsed();
        assert!(
            elapsed >= Duration::from_millis(min_ms) && elapsed < Duration::from_millis(max_ms),
            "elapsed {:?} not in [{}ms, {}ms)",
            elapsed,
            min_ms,
            max_ms
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success() {
        let exec = executor(vec![respond(200, None, "Success")], 200, 500);
        let start = Instant::now();

        let response = exec.execute("/success", &RequestOptions::get()).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.text(), "Success");
        assert_eq!(exec.transport().calls(), 1);
        assert_elapsed(start, 0, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_then_success_follows_backoff() {
        let exec = executor(
            vec![respond(503, None, ""), respond(503, None, ""), respond(200, None, "ok")],
            200,
            0,
        );
        let start = Instant::now();

        let response = exec.execute("/flaky", &RequestOptions::get()).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(exec.transport().calls(), 3);
        // 2000ms then 4000ms
        assert_elapsed(start, 6000, 6005);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_message() {
        let exec = executor(Vec::new(), 503, 500);

        let err = exec
            .execute_with_retries("/fail-always", &RequestOptions::get(), 3)
            .await
            .unwrap_err();

        assert_eq!(exec.transport().calls(), 3);
        assert_eq!(
            err.to_string(),
            "Request failed after 3 retries: Service Unavailable"
        );
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_not_retried() {
        let exec = executor(Vec::new(), 404, 500);
        let start = Instant::now();

        let err = exec.execute("/not-found", &RequestOptions::get()).await.unwrap_err();

        assert_eq!(exec.transport().calls(), 1);
        assert_eq!(err.to_string(), "Request failed with status 404: Not Found");
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert_elapsed(start, 0, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_after_seconds_honored() {
        let exec = executor(vec![respond(503, Some("1"), "")], 200, 500);
        let start = Instant::now();

        exec.execute("/busy", &RequestOptions::get()).await.unwrap();

        assert_eq!(exec.transport().calls(), 2);
        assert_elapsed(start, 1000, 1500);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retryable_scenario_with_retry_after() {
        let exec = executor(
            vec![
                respond(503, Some("1"), "Service Unavailable"),
                respond(503, Some("1"), "Service Unavailable"),
                respond(200, None, "Success after retries"),
            ],
            200,
            500,
        );
        let start = Instant::now();

        let response = exec.execute("/retryable", &RequestOptions::get()).await.unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.text(), "Success after retries");
        assert_eq!(exec.transport().calls(), 3);
        assert_elapsed(start, 2000, 3000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_retry_after_date_uses_initial_delay() {
        let exec = executor(
            vec![respond(429, Some("Wed, 21 Oct 2015 07:28:00 GMT"), "")],
            200,
            0,
        );
        let start = Instant::now();

        exec.execute("/limited", &RequestOptions::get()).await.unwrap();

        assert_eq!(exec.transport().calls(), 2);
        assert_elapsed(start, 1000, 1005);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unusable_retry_after_uses_initial_delay() {
        let exec = executor(
            vec![
                respond(503, None, ""),
                respond(503, Some("whenever"), ""),
            ],
            200,
            0,
        );
        let start = Instant::now();

        exec.execute("/busy", &RequestOptions::get()).await.unwrap();

        // 2000ms doubled from the seed, then 1000ms instead of 4000ms
        assert_eq!(exec.transport().calls(), 3);
        assert_elapsed(start, 3000, 3005);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fractional_retry_after_truncates() {
        let exec = executor(vec![respond(429, Some("1.5"), "")], 200, 0);
        let start = Instant::now();

        exec.execute("/limited", &RequestOptions::get()).await.unwrap();

        assert_elapsed(start, 1000, 1005);
    }

    #[tokio::test(start_paused = true)]
    async fn test_accepted_is_retried() {
        let exec = executor(vec![respond(202, None, "")], 200, 0);

        exec.execute("/processing", &RequestOptions::get()).await.unwrap();

        assert_eq!(exec.transport().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_then_success() {
        let exec = executor(vec![refused()], 200, 0);
        let start = Instant::now();

        exec.execute("/net", &RequestOptions::get()).await.unwrap();

        assert_eq!(exec.transport().calls(), 2);
        assert_elapsed(start, 2000, 2005);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_exhaustion_returns_raw_error() {
        let exec = executor(vec![refused(), refused(), refused()], 200, 0);

        let err = exec.execute("/network-error", &RequestOptions::get()).await.unwrap_err();

        assert_eq!(exec.transport().calls(), 3);
        assert!(matches!(err, FetchError::Transport(_)));
        assert_eq!(err.to_string(), "connection refused");
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_failures_share_budget() {
        let exec = executor(vec![refused(), respond(503, None, "")], 503, 0);

        let err = exec.execute("/mixed", &RequestOptions::get()).await.unwrap_err();

        assert_eq!(exec.transport().calls(), 3);
        assert!(matches!(err, FetchError::RetriesExhausted { max_retries: 3, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget() {
        let exec = executor(Vec::new(), 200, 0);

        let err = exec
            .execute_with_retries("/never", &RequestOptions::get(), 0)
            .await
            .unwrap_err();

        assert_eq!(exec.transport().calls(), 0);
        assert!(matches!(err, FetchError::MaxRetriesReached));
        assert_eq!(err.to_string(), "Max retries reached without successful response.");
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(1000));
        assert_eq!(policy.max_jitter, Duration::from_millis(500));
    }
}
