//! Server state tracking.
//!
//! # State Transitions
//! ```text
//! Unstarted → Running(addr): listener bound, accept loop entered
//! Running   → Stopped:       accept loop exited (listener closed)
//! ```
//!
//! A failed bind leaves the server `Unstarted`. A stopped server is never
//! restarted.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};

use tokio::sync::watch;

use crate::error::ServerError;

/// Lifecycle state of one server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// No listener has been bound.
    Unstarted,
    /// Listener bound on the given address, accept loop active.
    Running(SocketAddr),
    /// Listener closed, accept loop exited.
    Stopped,
}

impl ServerState {
    pub fn is_running(&self) -> bool {
        matches!(self, ServerState::Running(_))
    }
}

/// Shared state cell written by the accept loop and observed by `stop`.
#[derive(Debug, Clone)]
pub struct StateTracker {
    tx: Arc<watch::Sender<ServerState>>,
    bound: Arc<OnceLock<SocketAddr>>,
}

impl StateTracker {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ServerState::Unstarted);
        Self {
            tx: Arc::new(tx),
            bound: Arc::new(OnceLock::new()),
        }
    }

    pub fn current(&self) -> ServerState {
        *self.tx.borrow()
    }

    /// Address the listener was bound to. Stays set after the server stops.
    pub fn bound_addr(&self) -> Option<SocketAddr> {
        self.bound.get().copied()
    }

    /// Record a successful bind. Fails if the server ever ran before.
    pub fn mark_running(&self, addr: SocketAddr) -> Result<(), ServerError> {
        let moved = self.tx.send_if_modified(|state| {
            if *state == ServerState::Unstarted {
                *state = ServerState::Running(addr);
                true
            } else {
                false
            }
        });
        if !moved {
            return Err(ServerError::AlreadyStarted);
        }
        let _ = self.bound.set(addr);
        tracing::debug!(address = %addr, "Server running");
        Ok(())
    }

    /// Record that the accept loop has exited.
    pub fn mark_stopped(&self) {
        self.tx.send_if_modified(|state| {
            if state.is_running() {
                *state = ServerState::Stopped;
                true
            } else {
                false
            }
        });
    }

    /// Wait until the accept loop has exited.
    ///
    /// Returns immediately if the server never ran.
    pub async fn wait_stopped(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx
            .wait_for(|state| !state.is_running())
            .await
            .map(|_| ());
    }
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}
