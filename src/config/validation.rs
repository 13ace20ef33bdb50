//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: HostConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::HostConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Exactly one of cert_path / key_path is set.
    TlsPairing,
    ZeroShutdownTimeout,
    InvalidMetricsAddress(String),
    NoServerEnabled,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::TlsPairing => {
                write!(f, "http.cert_path and http.key_path must be set together")
            }
            ValidationError::ZeroShutdownTimeout => {
                write!(f, "http.shutdown_timeout_secs must be greater than 0")
            }
            ValidationError::InvalidMetricsAddress(addr) => {
                write!(f, "observability.metrics_address is not a socket address: {}", addr)
            }
            ValidationError::NoServerEnabled => write!(f, "at least one of http or rpc must be enabled"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Check the configuration for semantic errors.
pub fn validate_config(config: &HostConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if !config.http.enabled && !config.rpc.enabled {
        errors.push(ValidationError::NoServerEnabled);
    }

    if config.http.cert_path.is_empty() != config.http.key_path.is_empty() {
        errors.push(ValidationError::TlsPairing);
    }

    if config.http.shutdown_timeout_secs == 0 {
        errors.push(ValidationError::ZeroShutdownTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
