//! HTTP transport abstraction.
//!
//! # Responsibilities
//! - Describe a request as an opaque bag of method, headers and body
//! - Perform the request and buffer the response
//! - Report connection-level failures as `TransportError`

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Failure to get any HTTP response at all (refused connection, DNS, reset).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Connect(String),
}

/// Request parameters passed through to the transport untouched.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::get()
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// POST with a JSON body.
    pub fn post_json<B: Serialize>(body: &B) -> Result<Self, serde_json::Error> {
        Self::new(Method::POST).json(body)
    }

    /// PUT with a JSON body.
    pub fn put_json<B: Serialize>(body: &B) -> Result<Self, serde_json::Error> {
        Self::new(Method::PUT).json(body)
    }

    /// Replace the body with the JSON encoding of `body`.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_vec(body)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A fully buffered HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// True for any 2xx status.
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    /// Canonical reason phrase, e.g. "Service Unavailable".
    pub fn status_text(&self) -> &'static str {
        self.status.canonical_reason().unwrap_or("")
    }

    /// Raw `Retry-After` header value, if present and visible ASCII.
    pub fn retry_after(&self) -> Option<&str> {
        self.headers
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Something that can perform one HTTP request.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Production transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self
            .client
            .request(options.method.clone(), url)
            .headers(options.headers.clone());
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(HttpResponse::new(status, headers, body.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_options_set_content_type() {
        #[derive(Serialize)]
        struct Payload {
            name: &'static str,
        }

        let options = RequestOptions::post_json(&Payload { name: "Apex" }).unwrap();
        assert_eq!(options.method, Method::POST);
        assert_eq!(options.headers[CONTENT_TYPE], "application/json");
        assert_eq!(options.body.as_deref(), Some(br#"{"name":"Apex"}"#.as_slice()));
    }

    #[test]
    fn test_response_accessors() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static(" 2 "));
        let response = HttpResponse::new(StatusCode::SERVICE_UNAVAILABLE, headers, "busy");

        assert!(!response.ok());
        assert_eq!(response.status_text(), "Service Unavailable");
        assert_eq!(response.retry_after(), Some("2"));
        assert_eq!(response.text(), "busy");
    }

    #[test]
    fn test_missing_retry_after() {
        let response = HttpResponse::new(StatusCode::OK, HeaderMap::new(), Vec::new());
        assert!(response.ok());
        assert_eq!(response.retry_after(), None);
    }
}
