//! Start / ready / stop protocol shared by every transport.
//!
//! # Start race
//! ```text
//! start(addr)
//!     → record addr, validate (config errors return here)
//!     → spawn bind_and_run ──────────────┐ background task
//!     → select first of:                 │
//!         completion signal  ◀───────────┘  = startup failure (returned)
//!         START_WINDOW elapsed              = presumed success
//! ```
//!
//! A blocking accept loop never says "I am serving now", it only says "I
//! failed". Absence of failure within the window is taken as success. A
//! failure after the window is not visible through `start`: it is logged,
//! counted, and shows up as a failing `ready`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;

use crate::error::ServerError;
use crate::lifecycle::state::ServerState;
use crate::net::address::normalize;
use crate::observability::metrics;
use crate::transport::{HttpOption, HttpTransport, RpcOption, RpcTransport, Transport};

/// How long `start` waits for an early failure before presuming success.
pub const START_WINDOW: Duration = Duration::from_secs(1);

/// A network server driven through the start race.
pub struct Server<T: Transport> {
    transport: Arc<T>,
    addr: String,
}

impl Server<HttpTransport> {
    /// HTTP (or HTTPS, when TLS paths are given) server.
    pub fn http(options: impl IntoIterator<Item = HttpOption>) -> Self {
        Self::new(HttpTransport::new(options))
    }
}

impl Server<RpcTransport> {
    /// RPC server. The registration callback runs before this returns.
    pub fn rpc(options: impl IntoIterator<Item = RpcOption>) -> Self {
        Self::new(RpcTransport::new(options))
    }
}

impl<T: Transport> Server<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            addr: String::new(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Target address recorded by the last `start` call.
    pub fn address(&self) -> &str {
        &self.addr
    }

    /// Address the listener was bound to, once it has been.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.transport.state().bound_addr()
    }

    pub fn state(&self) -> ServerState {
        self.transport.state().current()
    }

    /// Start serving on `addr` in the background.
    ///
    /// Returns the startup error if the accept loop exits within
    /// [`START_WINDOW`], otherwise `Ok(())` with the loop still running.
    pub async fn start(&mut self, addr: &str) -> Result<(), ServerError> {
        let kind = self.transport.kind();
        if self.transport.state().current() != ServerState::Unstarted {
            tracing::warn!(address = %self.addr, kind = %kind, "Server already started");
            metrics::record_start(kind, "rejected");
            return Err(ServerError::AlreadyStarted);
        }
        self.addr = normalize(addr, self.transport.default_addr());

        if let Err(e) = self.transport.validate() {
            tracing::warn!(address = %self.addr, kind = %kind, error = %e, "Invalid server configuration");
            metrics::record_start(kind, "invalid");
            return Err(e);
        }

        let (done_tx, done_rx) = oneshot::channel();
        let transport = Arc::clone(&self.transport);
        let target = self.addr.clone();

        tokio::spawn(async move {
            let result = transport.bind_and_run(&target).await;
            // A send failure means start already returned success.
            if let Err(unobserved) = done_tx.send(result) {
                match unobserved {
                    Ok(()) => tracing::debug!(address = %target, kind = %kind, "Accept loop exited"),
                    Err(e) => {
                        tracing::error!(address = %target, kind = %kind, error = %e, "Accept loop failed after startup");
                        metrics::record_late_failure(kind);
                    }
                }
            }
        });

        match tokio::time::timeout(START_WINDOW, done_rx).await {
            Err(_elapsed) => {
                tracing::info!(address = %self.addr, kind = %kind, "Server started");
                metrics::record_start(kind, "started");
                Ok(())
            }
            Ok(Ok(Ok(()))) => {
                tracing::info!(address = %self.addr, kind = %kind, "Accept loop exited during startup window");
                metrics::record_start(kind, "exited");
                Ok(())
            }
            Ok(Ok(Err(e))) => {
                tracing::warn!(address = %self.addr, kind = %kind, error = %e, "Server failed to start");
                metrics::record_start(kind, "failed");
                Err(e)
            }
            Ok(Err(_dropped)) => {
                tracing::error!(address = %self.addr, kind = %kind, "Accept loop aborted during startup");
                metrics::record_start(kind, "aborted");
                Err(ServerError::Aborted)
            }
        }
    }

    /// Probe readiness. An error means "not ready" with its cause.
    pub async fn ready(&self) -> Result<bool, ServerError> {
        let kind = self.transport.kind();
        let result = self.transport.check_ready(&self.addr).await;
        match &result {
            Ok(ready) => tracing::debug!(address = %self.addr, kind = %kind, ready = *ready, "Readiness probed"),
            Err(e) => tracing::debug!(address = %self.addr, kind = %kind, error = %e, "Readiness probe failed"),
        }
        metrics::record_ready(kind, matches!(result, Ok(true)));
        result
    }

    /// Stop the server. Safe to call from any task and more than once.
    pub async fn stop(&self) -> Result<(), ServerError> {
        let kind = self.transport.kind();
        let result = self.transport.stop().await;
        match &result {
            Ok(()) => {
                tracing::info!(address = %self.addr, kind = %kind, "Server stopped");
                metrics::record_stop(kind, "ok");
            }
            Err(e) => {
                tracing::warn!(address = %self.addr, kind = %kind, error = %e, "Server stop reported an error");
                metrics::record_stop(kind, "error");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::state::StateTracker;
    use crate::transport::TransportKind;
    use async_trait::async_trait;
    use std::time::Instant;

    /// Transport whose accept loop is scripted by the test.
    struct Scripted {
        run_for: Duration,
        outcome: fn() -> Result<(), ServerError>,
        state: StateTracker,
    }

    impl Scripted {
        fn new(run_for: Duration, outcome: fn() -> Result<(), ServerError>) -> Self {
            Self {
                run_for,
                outcome,
                state: StateTracker::new(),
            }
        }
    }

    #[async_trait]
    impl Transport for Scripted {
        fn kind(&self) -> TransportKind {
            TransportKind::Rpc
        }

        async fn bind_and_run(&self, _addr: &str) -> Result<(), ServerError> {
            tokio::time::sleep(self.run_for).await;
            (self.outcome)()
        }

        async fn check_ready(&self, _addr: &str) -> Result<bool, ServerError> {
            Ok(true)
        }

        async fn stop(&self) -> Result<(), ServerError> {
            Ok(())
        }

        fn state(&self) -> &StateTracker {
            &self.state
        }
    }

    fn in_use() -> Result<(), ServerError> {
        Err(ServerError::Bind {
            addr: "test".into(),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        })
    }

    fn clean() -> Result<(), ServerError> {
        Ok(())
    }

    fn boom() -> Result<(), ServerError> {
        panic!("accept loop crashed")
    }

    #[tokio::test]
    async fn early_failure_is_returned() {
        let mut server = Server::new(Scripted::new(Duration::from_millis(10), in_use));
        let started = Instant::now();

        let err = server.start("127.0.0.1:1").await.unwrap_err();
        assert!(err.is_bind_conflict());
        assert!(started.elapsed() < START_WINDOW);
    }

    #[tokio::test]
    async fn late_failure_is_not_observed() {
        let mut server = Server::new(Scripted::new(START_WINDOW * 2, in_use));
        let started = Instant::now();

        assert!(server.start("127.0.0.1:1").await.is_ok());
        assert!(started.elapsed() >= START_WINDOW);
        assert!(started.elapsed() < START_WINDOW * 2);
    }

    #[tokio::test]
    async fn fast_clean_exit_is_success() {
        let mut server = Server::new(Scripted::new(Duration::ZERO, clean));
        assert!(server.start("127.0.0.1:1").await.is_ok());
    }

    #[tokio::test]
    async fn panicking_loop_is_aborted() {
        let mut server = Server::new(Scripted::new(Duration::ZERO, boom));
        assert!(matches!(server.start("127.0.0.1:1").await, Err(ServerError::Aborted)));
    }

    #[tokio::test]
    async fn start_records_normalised_address() {
        let mut server = Server::new(Scripted::new(Duration::ZERO, clean));
        server.start(":7000").await.unwrap();
        assert_eq!(server.address(), "0.0.0.0:7000");
    }

    #[tokio::test]
    async fn second_start_keeps_first_address() {
        let mut server = Server::new(Scripted::new(START_WINDOW * 2, in_use));
        server.start("127.0.0.1:7000").await.unwrap();
        server
            .transport()
            .state()
            .mark_running("127.0.0.1:7000".parse().unwrap())
            .unwrap();

        let started = Instant::now();
        let err = server.start("127.0.0.1:7001").await.unwrap_err();
        assert!(matches!(err, ServerError::AlreadyStarted));
        assert!(started.elapsed() < START_WINDOW);
        assert_eq!(server.address(), "127.0.0.1:7000");
    }

    #[tokio::test]
    async fn invalid_tls_fails_before_binding() {
        let mut server = Server::http([crate::transport::with_tls("cert.pem", "")]);
        let started = Instant::now();

        let err = server.start("127.0.0.1:0").await.unwrap_err();
        assert!(err.is_config_error());
        assert!(started.elapsed() < Duration::from_millis(100));
        assert_eq!(server.state(), ServerState::Unstarted);
        assert!(server.local_addr().is_none());
    }
}
