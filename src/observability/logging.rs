//! Structured logging bootstrap.
//!
//! # Responsibilities
//! - Build the log filter from `RUST_LOG`
//! - Pick the output format from `DAEMON_LOG_FORMAT`
//! - Install the global subscriber exactly once

use std::str::FromStr;

use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the filter directives.
pub const FILTER_ENV: &str = "RUST_LOG";
/// Environment variable selecting the output format.
pub const FORMAT_ENV: &str = "DAEMON_LOG_FORMAT";
/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "daemon_supervisor=info";

/// Errors raised while activating logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The filter directives could not be parsed.
    #[error("invalid log filter {directives:?}: {source}")]
    Filter {
        directives: String,
        #[source]
        source: tracing_subscriber::filter::ParseError,
    },

    /// The requested output format is not known.
    #[error("unknown log format {0:?} (expected compact, pretty or json)")]
    Format(String),

    /// A global subscriber was already installed.
    #[error("cannot install log subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::Format(s.to_string())),
        }
    }
}

/// Logging settings resolved before the service starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `EnvFilter` directives.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Read the logging settings from the process environment.
    pub fn from_env() -> Result<Self, LoggingError> {
        Self::from_vars(
            std::env::var(FILTER_ENV).ok(),
            std::env::var(FORMAT_ENV).ok(),
        )
    }

    /// Build settings from raw variable values; `None` means unset.
    pub fn from_vars(filter: Option<String>, format: Option<String>) -> Result<Self, LoggingError> {
        let format = match format {
            Some(f) => f.parse()?,
            None => LogFormat::default(),
        };
        Ok(Self {
            filter: filter.unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            format,
        })
    }

    /// Parse the filter directives.
    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        EnvFilter::try_new(&self.filter).map_err(|source| LoggingError::Filter {
            directives: self.filter.clone(),
            source,
        })
    }
}

/// Install the global subscriber writing to stderr.
///
/// Fails if the settings are invalid or a subscriber is already installed.
pub fn setup_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    match config.format {
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
    }

    tracing::debug!(filter = %config.filter, format = ?config.format, "Logging activated");
    Ok(())
}
