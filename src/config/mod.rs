//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, env overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → cloned into the server, the store and the client
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_port_override, load_config, parse_config, ConfigError};
pub use schema::AppConfig;
pub use schema::{
    AuthConfig, ClientConfig, CorsConfig, ListenerConfig, ObservabilityConfig, RetryConfig,
    StoreConfig, TimeoutConfig,
};
