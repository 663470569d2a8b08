//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing request
//!     → RequestOptions (method, headers, body; opaque to the retry logic)
//!     → Transport::send (reqwest in production, scripted in tests)
//!     → HttpResponse (status, headers, buffered body) or TransportError
//!     → resilience::executor decides: return, retry or fail
//! ```
//!
//! # Design Decisions
//! - The retry logic only sees the `Transport` trait, never reqwest
//! - Bodies are buffered so the caller can parse them after the retry loop

pub mod transport;

pub use transport::{HttpResponse, ReqwestTransport, RequestOptions, Transport, TransportError};
