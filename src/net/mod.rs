//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Configured "host:port"
//!     → address.rs (normalise, pick probe target, TCP dial)
//!     → tls.rs (cert/key pairing, PEM loading for HTTPS)
//!     → Hand off to the transport adapters
//!
//! resolve.rs: hostname → IP strings for the surrounding host process
//! ```

pub mod address;
pub mod resolve;
pub mod tls;

pub use address::{dial, normalize, probe_target, DEFAULT_HTTP_ADDR};
pub use tls::{load_tls_config, TlsPaths};
