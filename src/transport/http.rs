//! HTTP and HTTPS transport built on axum and axum-server.
//!
//! # Responsibilities
//! - Wrap the caller's Router with the health responder and request tracing
//! - Bind plaintext or TLS listeners (HTTP/1.1 + HTTP/2 over ALPN for TLS)
//! - Probe readiness through `GET /health` (plaintext) or a TCP dial (TLS)
//! - Graceful shutdown followed by a forced close

use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use axum_server::Handle;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::trace::TraceLayer;

use crate::error::ServerError;
use crate::http::health::{HealthLayer, HealthService, HEALTH_BODY, HEALTH_PATH};
use crate::lifecycle::state::StateTracker;
use crate::net::address::{dial, probe_target, DEFAULT_HTTP_ADDR, DIAL_TIMEOUT};
use crate::net::tls::{load_tls_config, TlsPaths};
use crate::transport::{Transport, TransportKind};

/// Deadline for in-flight requests during `stop`.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra wait for the accept loop to exit after a forced close.
const STOP_GRACE: Duration = Duration::from_secs(1);

/// HTTP/2 stream limit per connection on TLS listeners.
pub const MAX_CONCURRENT_STREAMS: u32 = 250;

/// Largest health body read by the readiness probe.
const PROBE_BODY_LIMIT: usize = 1024;

/// A named configuration effect for [`HttpTransport`].
#[derive(Debug)]
pub enum HttpOption {
    /// Router serving every request except the health probe.
    Handler(Router),
    /// Certificate and key paths. Both or neither must be non-empty.
    Tls(TlsPaths),
    /// Graceful shutdown deadline.
    ShutdownTimeout(Duration),
}

impl HttpOption {
    fn apply(self, transport: &mut HttpTransport) {
        match self {
            HttpOption::Handler(router) => transport.handler = Some(router),
            HttpOption::Tls(paths) => transport.tls = paths,
            HttpOption::ShutdownTimeout(timeout) => transport.shutdown_timeout = timeout,
        }
    }
}

pub fn with_handler(router: Router) -> HttpOption {
    HttpOption::Handler(router)
}

pub fn with_tls(cert: impl Into<std::path::PathBuf>, key: impl Into<std::path::PathBuf>) -> HttpOption {
    HttpOption::Tls(TlsPaths::new(cert, key))
}

pub fn with_shutdown_timeout(timeout: Duration) -> HttpOption {
    HttpOption::ShutdownTimeout(timeout)
}

/// HTTP server adapter. TLS is enabled when both certificate paths are set.
pub struct HttpTransport {
    handler: Option<Router>,
    tls: TlsPaths,
    shutdown_timeout: Duration,
    handle: Handle,
    state: StateTracker,
    client: Client<HttpConnector, Body>,
}

impl HttpTransport {
    /// Create an adapter from options, applied in order.
    pub fn new(options: impl IntoIterator<Item = HttpOption>) -> Self {
        let client = Client::builder(TokioExecutor::new())
            .pool_max_idle_per_host(0)
            .build(HttpConnector::new());

        let mut transport = Self {
            handler: None,
            tls: TlsPaths::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            handle: Handle::new(),
            state: StateTracker::new(),
            client,
        };
        for option in options {
            option.apply(&mut transport);
        }
        transport
    }

    /// True when both TLS paths are supplied.
    pub fn is_tls(&self) -> bool {
        matches!(self.tls.validate(), Ok(true))
    }

    pub fn tls_paths(&self) -> &TlsPaths {
        &self.tls
    }

    pub fn shutdown_timeout(&self) -> Duration {
        self.shutdown_timeout
    }

    /// The service actually served: health responder around the traced handler.
    fn app(&self) -> HealthService<Router> {
        let handler = self
            .handler
            .clone()
            .unwrap_or_default()
            .layer(TraceLayer::new_for_http());
        HealthLayer.layer(handler)
    }

    async fn probe_health(&self, target: &str) -> Result<bool, ServerError> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(format!("http://{}{}", target, HEALTH_PATH))
            .header("user-agent", "server-lifecycle-ready")
            .body(Body::empty())
            .map_err(|e| ServerError::Probe(e.to_string()))?;

        let response = match tokio::time::timeout(DIAL_TIMEOUT, self.client.request(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(ServerError::Probe(e.to_string())),
            Err(_) => return Err(ServerError::Probe(format!("no response within {:?}", DIAL_TIMEOUT))),
        };

        let status = response.status();
        let body = match to_bytes(Body::new(response.into_body()), PROBE_BODY_LIMIT).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(address = %target, error = %e, "Health body unreadable");
                return Err(ServerError::Probe(e.to_string()));
            }
        };

        let healthy = status.is_success() && body.as_ref() == HEALTH_BODY.as_bytes();
        if !healthy {
            tracing::warn!(address = %target, status = %status, "Health probe answered unhealthy");
        }
        Ok(healthy)
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new([])
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn kind(&self) -> TransportKind {
        if self.is_tls() {
            TransportKind::Https
        } else {
            TransportKind::Http
        }
    }

    fn default_addr(&self) -> Option<&'static str> {
        Some(DEFAULT_HTTP_ADDR)
    }

    fn validate(&self) -> Result<(), ServerError> {
        self.tls.validate().map(|_| ())
    }

    async fn bind_and_run(&self, addr: &str) -> Result<(), ServerError> {
        let tls = if self.tls.validate()? {
            Some(load_tls_config(&self.tls.cert, &self.tls.key).await?)
        } else {
            None
        };

        let bind_error = |source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        };
        let listener = TcpListener::bind(addr).await.map_err(bind_error)?;
        let local_addr = listener.local_addr().map_err(bind_error)?;
        let listener = listener.into_std().map_err(bind_error)?;
        self.state.mark_running(local_addr)?;

        tracing::info!(address = %local_addr, kind = %self.kind(), "HTTP server listening");

        let app = axum::ServiceExt::<axum::extract::Request>::into_make_service(self.app());
        let result = match tls {
            Some(config) => {
                let mut server = axum_server::tls_rustls::from_tcp_rustls(listener, config).handle(self.handle.clone());
                server
                    .http_builder()
                    .http2()
                    .max_concurrent_streams(MAX_CONCURRENT_STREAMS);
                server.serve(app).await
            }
            None => {
                axum_server::from_tcp(listener)
                    .handle(self.handle.clone())
                    .serve(app)
                    .await
            }
        };

        self.state.mark_stopped();
        tracing::info!(address = %local_addr, "HTTP server stopped");
        result.map_err(ServerError::Serve)
    }

    async fn check_ready(&self, addr: &str) -> Result<bool, ServerError> {
        let target = probe_target(self.state.bound_addr(), addr);
        dial(&target).await?;
        if self.is_tls() {
            return Ok(true);
        }
        self.probe_health(&target).await
    }

    async fn stop(&self) -> Result<(), ServerError> {
        // Signalled even when not yet running, so a bind racing this call exits at once.
        self.handle.graceful_shutdown(Some(self.shutdown_timeout));

        // The loop exits at the deadline at the latest, since axum-server forces
        // connections closed then. Only an exit before the deadline counts as graceful.
        let started = Instant::now();
        let exited = tokio::time::timeout(self.shutdown_timeout + STOP_GRACE, self.state.wait_stopped())
            .await
            .is_ok();
        let graceful = if exited && started.elapsed() < self.shutdown_timeout {
            Ok(())
        } else {
            Err(ServerError::ShutdownTimeout(self.shutdown_timeout))
        };

        // Forced close; nothing to report beyond the graceful outcome.
        self.handle.shutdown();
        graceful
    }

    fn state(&self) -> &StateTracker {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[test]
    fn options_apply_in_order() {
        let transport = HttpTransport::new([
            with_tls("first.pem", "first.key"),
            with_shutdown_timeout(Duration::from_secs(5)),
            with_tls("second.pem", "second.key"),
        ]);

        assert_eq!(transport.tls_paths(), &TlsPaths::new("second.pem", "second.key"));
        assert_eq!(transport.shutdown_timeout(), Duration::from_secs(5));
        assert_eq!(transport.kind(), TransportKind::Https);
    }

    #[test]
    fn defaults_to_plaintext() {
        let transport = HttpTransport::default();
        assert_eq!(transport.kind(), TransportKind::Http);
        assert_eq!(transport.default_addr(), Some(DEFAULT_HTTP_ADDR));
        assert_eq!(transport.shutdown_timeout(), DEFAULT_SHUTDOWN_TIMEOUT);
        assert!(transport.validate().is_ok());
    }

    #[test]
    fn half_configured_tls_is_rejected() {
        let transport = HttpTransport::new([with_tls("cert.pem", "")]);
        assert!(transport.validate().unwrap_err().is_config_error());
        assert_eq!(transport.kind(), TransportKind::Http);
    }

    /// Serve one canned response to every connection that sends a request.
    async fn canned_server(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    match socket.read(&mut buf).await {
                        Ok(n) if n > 0 => {
                            let _ = socket.write_all(response.as_bytes()).await;
                            let _ = socket.shutdown().await;
                        }
                        _ => {}
                    }
                });
            }
        });
        addr
    }

    #[tokio::test]
    async fn truncated_health_body_reports_cause() {
        let addr = canned_server("HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nOK").await;
        let transport = HttpTransport::default();

        let err = transport.check_ready(&addr).await.unwrap_err();
        assert!(matches!(err, ServerError::Probe(_)), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn health_body_must_match_exactly() {
        let addr = canned_server("HTTP/1.1 200 OK\r\nContent-Length: 6\r\nConnection: close\r\n\r\nNOT OK").await;
        let transport = HttpTransport::default();

        assert!(!transport.check_ready(&addr).await.unwrap());
    }

    #[tokio::test]
    async fn health_status_must_be_success() {
        let addr = canned_server(
            "HTTP/1.1 503 Service Unavailable\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK",
        )
        .await;
        let transport = HttpTransport::default();

        assert!(!transport.check_ready(&addr).await.unwrap());
    }

    #[tokio::test]
    async fn healthy_canned_server_is_ready() {
        let addr = canned_server("HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\nOK").await;
        let transport = HttpTransport::default();

        assert!(transport.check_ready(&addr).await.unwrap());
    }

    #[tokio::test]
    async fn stop_before_start_is_ok() {
        let transport = HttpTransport::default();
        assert!(transport.stop().await.is_ok());
        assert!(transport.stop().await.is_ok());
    }
}
