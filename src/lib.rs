//! Uniform lifecycle for network-facing servers.
//!
//! A blocking accept loop is started in the background and raced against a
//! short startup window, so bind and TLS failures come back from `start`
//! while a healthy server keeps running unattended. Every transport exposes
//! the same `start` / `ready` / `stop` contract.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod transport;

pub use error::ServerError;
pub use http::HealthLayer;
pub use lifecycle::{Server, ServerState, START_WINDOW};
pub use transport::{
    with_handler, with_service_register, with_shutdown_timeout, with_tls, HttpOption, HttpTransport,
    RpcOption, RpcTransport, Transport, TransportKind,
};
