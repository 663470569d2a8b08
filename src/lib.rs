//! Jobzan: a small job-search tracker service.
//!
//! The server keeps employers and the jobs posted at them, exposes them over
//! a JSON REST API, and pivots average salary by status and commute type.
//! The client side talks to that API through a retrying fetch executor that
//! honours `Retry-After` and applies exponential backoff with jitter.

pub mod client;
pub mod config;
pub mod domain;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod store;

pub use client::JobzanClient;
pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::{FetchError, RetryExecutor, RetryPolicy};
pub use store::Store;
