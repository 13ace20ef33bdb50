//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Start (controller.rs):
//!     Record addr → Validate → Spawn accept loop → Race against START_WINDOW
//!
//! Ready (controller.rs):
//!     Delegate to the transport probe
//!
//! Stop (controller.rs):
//!     Delegate to the transport → wait for state.rs to report Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → host stops every server
//! ```
//!
//! # Design Decisions
//! - Start blocks for at most START_WINDOW
//! - No retries: every failure goes back to the caller
//! - Failures after the window are logged, not returned from start

pub mod controller;
pub mod signals;
pub mod state;

pub use controller::{Server, START_WINDOW};
pub use state::{ServerState, StateTracker};
