//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Process start
//!     → logging.rs (read RUST_LOG / DAEMON_LOG_FORMAT, install subscriber)
//!     → all subsystems emit `tracing` events
//!     → stderr (compact, pretty or JSON lines)
//! ```
//!
//! # Design Decisions
//! - Structured logging via `tracing`; fields over interpolated strings
//! - Logging setup is best effort: a failure is reported, never fatal
//! - Installed once, before anything else runs

pub mod logging;

pub use logging::{setup_logging, LogFormat, LoggingConfig, LoggingError};
