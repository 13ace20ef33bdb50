//! Error taxonomy for server lifecycle operations.
//!
//! # Categories
//! - Configuration: detected before any network action (`InvalidCertOrKey`)
//! - Startup: bind, TLS loading and early accept-loop failures
//! - Readiness: dial and probe failures (the server is "not ready")
//! - Shutdown: graceful deadline exceeded

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors produced by transports and the lifecycle controller.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Exactly one of the TLS certificate / key paths was supplied.
    #[error("invalid cert or key")]
    InvalidCertOrKey,

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// TLS material could not be read or parsed.
    #[error("failed to load TLS material: {0}")]
    Tls(#[source] io::Error),

    #[error("rpc transport error: {0}")]
    Rpc(#[from] tonic::transport::Error),

    /// The HTTP accept loop failed.
    #[error("http server error: {0}")]
    Serve(#[source] io::Error),

    #[error("server has already been started")]
    AlreadyStarted,

    /// The background accept loop terminated without reporting (panic).
    #[error("accept loop terminated unexpectedly")]
    Aborted,

    #[error("{addr} is unreachable: {source}")]
    Unreachable {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("health probe failed: {0}")]
    Probe(String),

    #[error("graceful shutdown did not finish within {0:?}")]
    ShutdownTimeout(Duration),
}

impl ServerError {
    /// True for errors raised before any network I/O was attempted.
    pub fn is_config_error(&self) -> bool {
        matches!(self, ServerError::InvalidCertOrKey)
    }

    /// True if the error is a bind failure caused by the address being taken.
    pub fn is_bind_conflict(&self) -> bool {
        match self {
            ServerError::Bind { source, .. } => source.kind() == io::ErrorKind::AddrInUse,
            ServerError::Serve(source) => source.kind() == io::ErrorKind::AddrInUse,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_errors() {
        assert!(ServerError::InvalidCertOrKey.is_config_error());
        assert!(!ServerError::Aborted.is_config_error());

        let conflict = ServerError::Bind {
            addr: "127.0.0.1:1".into(),
            source: io::Error::from(io::ErrorKind::AddrInUse),
        };
        assert!(conflict.is_bind_conflict());

        let denied = ServerError::Bind {
            addr: "127.0.0.1:1".into(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(!denied.is_bind_conflict());
    }

    #[test]
    fn config_error_message() {
        assert_eq!(ServerError::InvalidCertOrKey.to_string(), "invalid cert or key");
    }
}
