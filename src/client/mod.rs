//! Typed data-access client for the tracker API.
//!
//! Every call goes through [`RetryExecutor`], so transient 202/429/503
//! responses and connection failures are retried before an error reaches
//! the caller. Response bodies are decoded here; callers get domain types.

use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::ClientConfig;
use crate::domain::{Commute, Employer, EmployerInput, Job, JobInput, JobStatus};
use crate::http::analytics::SalaryPivotRow;
use crate::net::{HttpResponse, ReqwestTransport, RequestOptions, Transport};
use crate::observability::metrics;
use crate::resilience::{with_deadline, FetchError, RetryExecutor, RetryPolicy};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Failed to encode or decode body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid base URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Base URL '{0}' cannot carry a path")]
    BaseUrl(String),

    #[error("API token is not a valid header value")]
    InvalidToken,
}

impl ClientError {
    /// HTTP status of the failure, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Fetch(e) => e.status(),
            _ => None,
        }
    }
}

/// Optional filters for [`JobzanClient::list_jobs`].
#[derive(Debug, Clone, Default)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub commute: Option<Commute>,
    pub employer_id: Option<String>,
}

pub struct JobzanClient<T> {
    executor: RetryExecutor<T>,
    base: Url,
    auth: Option<HeaderValue>,
    deadline: Option<Duration>,
}

impl JobzanClient<ReqwestTransport> {
    /// Client over reqwest, configured from `[client]`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut client = Self::new(
            ReqwestTransport::new(),
            &config.base_url,
            RetryPolicy::from(&config.retries),
        )?;
        client.deadline = config.deadline_secs.map(Duration::from_secs);
        Ok(client)
    }
}

impl<T: Transport> JobzanClient<T> {
    pub fn new(transport: T, base_url: &str, policy: RetryPolicy) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ClientError::BaseUrl(base_url.to_string()));
        }
        Ok(Self {
            executor: RetryExecutor::new(transport, policy),
            base,
            auth: None,
            deadline: None,
        })
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_token(mut self, token: &str) -> Result<Self, ClientError> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientError::InvalidToken)?;
        self.auth = Some(value);
        Ok(self)
    }

    /// Hard deadline for each call, retries included.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn executor(&self) -> &RetryExecutor<T> {
        &self.executor
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::BaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn call(&self, url: Url, mut options: RequestOptions) -> Result<HttpResponse, ClientError> {
        if let Some(auth) = &self.auth {
            options = options.header(AUTHORIZATION, auth.clone());
        }

        let url = url.as_str();
        let call = self.executor.execute(url, &options);
        let result = match self.deadline {
            Some(deadline) => with_deadline(deadline, call).await,
            None => call.await,
        };

        result.map_err(|e| {
            metrics::record_client_failure(e.kind());
            tracing::error!(url = %url, method = %options.method, error = %e, "API request failed");
            ClientError::Fetch(e)
        })
    }

    async fn get_json<R: DeserializeOwned>(&self, url: Url) -> Result<R, ClientError> {
        let response = self.call(url, RequestOptions::get()).await?;
        Ok(response.json()?)
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        self.get_json(self.endpoint(&["health"])?).await
    }

    // --- Jobs ---

    pub async fn list_jobs(&self, filter: &JobFilter) -> Result<Vec<Job>, ClientError> {
        let mut url = self.endpoint(&["api", "jobs"])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(status) = filter.status {
                query.append_pair("status", status.as_str());
            }
            if let Some(commute) = filter.commute {
                query.append_pair("commute", commute.as_str());
            }
            if let Some(employer_id) = &filter.employer_id {
                query.append_pair("employerId", employer_id);
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.get_json(url).await
    }

    pub async fn get_job(&self, id: &str) -> Result<Job, ClientError> {
        self.get_json(self.endpoint(&["api", "jobs", id])?).await
    }

    pub async fn create_job(&self, job: &JobInput) -> Result<Job, ClientError> {
        let url = self.endpoint(&["api", "jobs"])?;
        let response = self.call(url, RequestOptions::post_json(job)?).await?;
        Ok(response.json()?)
    }

    pub async fn update_job(&self, id: &str, job: &JobInput) -> Result<Job, ClientError> {
        let url = self.endpoint(&["api", "jobs", id])?;
        let response = self.call(url, RequestOptions::put_json(job)?).await?;
        Ok(response.json()?)
    }

    pub async fn delete_job(&self, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "jobs", id])?;
        self.call(url, RequestOptions::delete()).await?;
        Ok(())
    }

    // --- Employers ---

    pub async fn list_employers(&self) -> Result<Vec<Employer>, ClientError> {
        self.get_json(self.endpoint(&["api", "employers"])?).await
    }

    pub async fn get_employer(&self, id: &str) -> Result<Employer, ClientError> {
        self.get_json(self.endpoint(&["api", "employers", id])?).await
    }

    pub async fn create_employer(&self, employer: &EmployerInput) -> Result<Employer, ClientError> {
        let url = self.endpoint(&["api", "employers"])?;
        let response = self.call(url, RequestOptions::post_json(employer)?).await?;
        Ok(response.json()?)
    }

    pub async fn update_employer(
        &self,
        id: &str,
        employer: &EmployerInput,
    ) -> Result<Employer, ClientError> {
        let url = self.endpoint(&["api", "employers", id])?;
        let response = self.call(url, RequestOptions::put_json(employer)?).await?;
        Ok(response.json()?)
    }

    /// Deletes the employer and, server-side, all of its jobs.
    pub async fn delete_employer(&self, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["api", "employers", id])?;
        self.call(url, RequestOptions::delete()).await?;
        Ok(())
    }

    pub async fn salary_pivot(&self) -> Result<Vec<SalaryPivotRow>, ClientError> {
        self.get_json(self.endpoint(&["api", "analytics"])?).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::TransportError;
    use reqwest::header::HeaderMap;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    /// Records requests and answers every one with the same response.
    struct Recorder {
        status: StatusCode,
        body: &'static str,
        seen: Mutex<Vec<(String, RequestOptions)>>,
    }

    impl Recorder {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status: StatusCode::from_u16(status).unwrap(),
                body,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Recorder {
        async fn send(
            &self,
            url: &str,
            options: &RequestOptions,
        ) -> Result<HttpResponse, TransportError> {
            self.seen
                .lock()
                .unwrap()
                .push((url.to_string(), options.clone()));
            Ok(HttpResponse::new(self.status, HeaderMap::new(), self.body))
        }
    }

    fn client(status: u16, body: &'static str, base: &str) -> JobzanClient<Recorder> {
        JobzanClient::new(Recorder::new(status, body), base, RetryPolicy::default()).unwrap()
    }

    fn seen_urls(client: &JobzanClient<Recorder>) -> Vec<String> {
        client
            .executor()
            .transport()
            .seen
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_urls_keep_base_path() {
        let client = client(200, "[]", "http://api.example/prefix/");
        client.list_employers().await.unwrap();
        client.list_jobs(&JobFilter::default()).await.unwrap();
        assert_eq!(
            seen_urls(&client),
            [
                "http://api.example/prefix/api/employers",
                "http://api.example/prefix/api/jobs"
            ]
        );
    }

    #[tokio::test]
    async fn test_job_filter_query() {
        let client = client(200, "[]", "http://api.example");
        let filter = JobFilter {
            status: Some(JobStatus::Applied),
            commute: Some(Commute::OnSite),
            employer_id: None,
        };
        client.list_jobs(&filter).await.unwrap();
        assert_eq!(
            seen_urls(&client),
            ["http://api.example/api/jobs?status=applied&commute=on-site"]
        );
    }

    #[tokio::test]
    async fn test_ids_are_escaped() {
        let client = client(204, "", "http://api.example");
        client.delete_job("a/b c").await.unwrap();
        assert_eq!(seen_urls(&client), ["http://api.example/api/jobs/a%2Fb%20c"]);
    }

    #[tokio::test]
    async fn test_token_header() {
        let client = client(200, "{}", "http://api.example")
            .with_token("s3cret")
            .unwrap();
        client.health().await.unwrap();

        let seen = client.executor().transport().seen.lock().unwrap();
        assert_eq!(seen[0].1.headers[AUTHORIZATION], "Bearer s3cret");
    }

    #[tokio::test]
    async fn test_not_found_surfaces_status() {
        let client = client(404, "Job not found", "http://api.example");
        let err = client.get_job("missing").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Request failed with status 404: Not Found");
    }

    #[tokio::test]
    async fn test_bad_body_is_decode_error() {
        let client = client(200, "not json", "http://api.example");
        let err = client.list_employers().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[test]
    fn test_rejects_non_base_url() {
        let result = JobzanClient::new(Recorder::new(200, ""), "mailto:me@example.com", RetryPolicy::default());
        assert!(matches!(result, Err(ClientError::BaseUrl(_))));
    }
}
