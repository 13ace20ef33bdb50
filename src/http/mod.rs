//! HTTP request handling subsystem.
//!
//! # Data Flow
//! ```text
//! Accepted HTTP request
//!     → health.rs (GET /health answered directly with "OK")
//!     → caller-supplied axum Router (everything else)
//!     → Send to client
//! ```

pub mod health;

pub use health::{health_response, HealthLayer, HealthService, HEALTH_BODY, HEALTH_PATH};
