//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle controller and transports produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (start/ready/stop counters)
//!
//! Consumers:
//!     → stdout (fmt or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
