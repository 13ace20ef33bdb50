//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → HostConfig (validated, immutable)
//!     → turned into transport options by the service host
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; servers are never reconfigured
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{HostConfig, HttpConfig, ObservabilityConfig, RpcConfig};
pub use validation::{validate_config, ValidationError};
