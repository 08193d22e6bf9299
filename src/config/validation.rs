//! Configuration validation.
//!
//! Returns every problem found, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::DaemonConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("listener.max_connections must be greater than 0")]
    ZeroConnections,

    #[error("service.name must not be empty")]
    EmptyName,
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &DaemonConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.max_connections == 0 {
        errors.push(ValidationError::ZeroConnections);
    }
    if config.service.name.trim().is_empty() {
        errors.push(ValidationError::EmptyName);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
