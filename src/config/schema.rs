//! Configuration schema definitions for the service host.
//!
//! All types derive Serde traits and default every field, so an empty file
//! is a valid configuration.

use serde::{Deserialize, Serialize};

/// Root configuration for the service host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HostConfig {
    /// HTTP/HTTPS server settings.
    pub http: HttpConfig,

    /// RPC server settings.
    pub rpc: RpcConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:8080"). Empty means "0.0.0.0:80".
    pub bind_address: String,

    /// Path to certificate file (PEM). Requires `key_path`.
    pub cert_path: String,

    /// Path to private key file (PEM). Requires `cert_path`.
    pub key_path: String,

    /// Graceful shutdown deadline in seconds.
    pub shutdown_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0:8080".to_string(),
            cert_path: String::new(),
            key_path: String::new(),
            shutdown_timeout_secs: 30,
        }
    }
}

/// RPC server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    pub enabled: bool,

    /// Bind address (e.g., "0.0.0.0:9000").
    pub bind_address: String,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind_address: "0.0.0.0:9000".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
