//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware: request id, trace, CORS, timeout)
//!     → auth.rs (bearer token guard on /api/*)
//!     → employers.rs / jobs.rs / analytics.rs (handlers over the store)
//!     → error.rs (store failures → status codes)
//!     → Send to client
//! ```

pub mod analytics;
pub mod auth;
pub mod employers;
pub mod error;
pub mod jobs;
pub mod server;

pub use error::ApiError;
pub use server::{AppState, HttpServer};
