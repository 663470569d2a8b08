//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT / SIGTERM → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscriber (HTTP server) stops accepting and drains
//!     → store snapshot saved → exit
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
