//! RPC transport built on tonic.
//!
//! Services are registered once, through a caller-supplied callback that
//! runs inside the constructor, before any network activity.

use std::fmt;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::service::{Routes, RoutesBuilder};

use crate::error::ServerError;
use crate::lifecycle::state::StateTracker;
use crate::net::address::{dial, probe_target};
use crate::transport::{Transport, TransportKind};

/// Callback that registers services on the RPC engine.
pub type ServiceRegister = Box<dyn FnOnce(&mut RoutesBuilder) + Send>;

/// A named configuration effect for [`RpcTransport`].
pub enum RpcOption {
    ServiceRegister(ServiceRegister),
}

impl RpcOption {
    fn apply(self, register: &mut Option<ServiceRegister>) {
        match self {
            RpcOption::ServiceRegister(callback) => *register = Some(callback),
        }
    }
}

impl fmt::Debug for RpcOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcOption::ServiceRegister(_) => f.write_str("ServiceRegister(..)"),
        }
    }
}

pub fn with_service_register<F>(callback: F) -> RpcOption
where
    F: FnOnce(&mut RoutesBuilder) + Send + 'static,
{
    RpcOption::ServiceRegister(Box::new(callback))
}

/// RPC server adapter over a plain TCP listener.
pub struct RpcTransport {
    routes: Routes,
    stop_tx: watch::Sender<bool>,
    state: StateTracker,
}

impl RpcTransport {
    /// Create an adapter from options and run the registration callback.
    pub fn new(options: impl IntoIterator<Item = RpcOption>) -> Self {
        let mut register = None;
        for option in options {
            option.apply(&mut register);
        }

        let mut builder = RoutesBuilder::default();
        if let Some(register) = register {
            register(&mut builder);
        }

        let (stop_tx, _) = watch::channel(false);
        Self {
            routes: builder.routes(),
            stop_tx,
            state: StateTracker::new(),
        }
    }
}

impl Default for RpcTransport {
    fn default() -> Self {
        Self::new([])
    }
}

async fn stop_requested(mut rx: watch::Receiver<bool>) {
    loop {
        let stopped = *rx.borrow_and_update();
        if stopped || rx.changed().await.is_err() {
            return;
        }
    }
}

#[async_trait]
impl Transport for RpcTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Rpc
    }

    async fn bind_and_run(&self, addr: &str) -> Result<(), ServerError> {
        let bind_error = |source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        };
        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        self.state.mark_running(local_addr)?;

        tracing::info!(address = %local_addr, "RPC server listening");

        let serve = tonic::transport::Server::builder()
            .add_routes(self.routes.clone())
            .serve_with_incoming(TcpListenerStream::new(listener));

        // Dropping the serve future closes the listener without draining.
        let result = tokio::select! {
            result = serve => result.map_err(ServerError::from),
            _ = stop_requested(self.stop_tx.subscribe()) => Ok(()),
        };

        self.state.mark_stopped();
        tracing::info!(address = %local_addr, "RPC server stopped");
        result
    }

    async fn check_ready(&self, addr: &str) -> Result<bool, ServerError> {
        dial(&probe_target(self.state.bound_addr(), addr)).await?;
        Ok(true)
    }

    async fn stop(&self) -> Result<(), ServerError> {
        self.stop_tx.send_replace(true);
        self.state.wait_stopped().await;
        Ok(())
    }

    fn state(&self) -> &StateTracker {
        &self.state
    }
}
