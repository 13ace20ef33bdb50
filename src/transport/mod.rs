//! Transport adapters.
//!
//! # Data Flow
//! ```text
//! Options (applied in order, last write wins)
//!     → adapter constructor (http.rs / rpc.rs)
//!     → Transport::validate        (synchronous preconditions)
//!     → Transport::bind_and_run    (bind + blocking accept loop)
//!     → Transport::check_ready     (TCP dial or GET /health)
//!     → Transport::stop            (graceful / forced shutdown)
//! ```
//!
//! # Design Decisions
//! - One trait for every transport; the lifecycle controller never
//!   branches on the transport kind
//! - `bind_and_run` only returns when the accept loop is over
//! - Each adapter owns its listener and its state tracker exclusively

pub mod http;
pub mod rpc;

use std::fmt;

use async_trait::async_trait;

use crate::error::ServerError;
use crate::lifecycle::state::StateTracker;

pub use http::{with_handler, with_shutdown_timeout, with_tls, HttpOption, HttpTransport};
pub use rpc::{with_service_register, RpcOption, RpcTransport};

/// The kind of network server an adapter runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// Plain TCP listener driving the RPC engine.
    Rpc,
    /// HTTP over plaintext TCP.
    Http,
    /// HTTP over TLS with HTTP/2 negotiated through ALPN.
    Https,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Rpc => "rpc",
            TransportKind::Http => "http",
            TransportKind::Https => "https",
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transport-specific bind/run/ready/stop behaviour.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    fn kind(&self) -> TransportKind;

    /// Address used when the caller passes an empty one.
    fn default_addr(&self) -> Option<&'static str> {
        None
    }

    /// Preconditions checked before any network I/O.
    fn validate(&self) -> Result<(), ServerError> {
        Ok(())
    }

    /// Bind `addr` and run the accept loop until it exits or fails.
    async fn bind_and_run(&self, addr: &str) -> Result<(), ServerError>;

    /// Probe whether the server at `addr` is currently able to serve.
    ///
    /// `Ok(false)` means the server answered but not with a healthy response.
    async fn check_ready(&self, addr: &str) -> Result<bool, ServerError>;

    /// Stop accepting and release the listener.
    ///
    /// Must tolerate being called more than once.
    async fn stop(&self) -> Result<(), ServerError>;

    fn state(&self) -> &StateTracker;
}
