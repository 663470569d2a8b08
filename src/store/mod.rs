//! Storage for employers and jobs.
//!
//! # Responsibilities
//! - Concurrent CRUD over both collections
//! - Referential checks (a job must point at a known employer)
//! - Cascading employer deletes to their jobs
//! - Optional JSON snapshot persistence
//!
//! # Design Decisions
//! - `DashMap` per collection, shared via `Arc` so clones see the same data
//! - Ids are UUIDv7 strings, so sorting by id lists in creation order
//! - One writer at a time: mutations and snapshot saves share a lock
//! - Snapshot written after every mutation (temp file + rename) and on shutdown

mod memory;
pub mod seed;

pub use memory::{Snapshot, Store};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot format error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Unknown employer '{0}'")]
    UnknownEmployer(String),
}
