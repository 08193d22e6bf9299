//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! DAEMON_CONFIG (path to TOML file, optional)
//!     → loader.rs (read & deserialize, or defaults when unset)
//!     → validation.rs (semantic checks)
//!     → DaemonConfig (validated, immutable)
//!     → owned by the daemon for its lifetime
//! ```
//!
//! # Design Decisions
//! - Config is read once, during Initialize; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError, CONFIG_ENV};
pub use schema::{DaemonConfig, ListenerConfig, ServiceInfoConfig};
pub use validation::{validate_config, ValidationError};
