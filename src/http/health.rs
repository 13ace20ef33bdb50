//! Health responder middleware.
//!
//! Answers `GET /health` with `200 OK` and body `OK` before the wrapped
//! service sees the request. Everything else is passed through untouched.

use std::task::{Context, Poll};

use axum::{
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::future::{ready, Either, Ready};
use tower::{Layer, Service};

/// Path answered by the responder.
pub const HEALTH_PATH: &str = "/health";

/// Body returned for a healthy server.
pub const HEALTH_BODY: &str = "OK";

/// Layer that wraps a service with [`HealthService`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthLayer;

impl<S> Layer<S> for HealthLayer {
    type Service = HealthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        HealthService::new(inner)
    }
}

/// Service that intercepts health probes and delegates the rest.
#[derive(Debug, Clone)]
pub struct HealthService<S> {
    inner: S,
}

impl<S> HealthService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, B> Service<Request<B>> for HealthService<S>
where
    S: Service<Request<B>, Response = Response>,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Either<Ready<Result<Response, S::Error>>, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        if is_health_probe(&req) {
            return Either::Left(ready(Ok(health_response())));
        }
        Either::Right(self.inner.call(req))
    }
}

fn is_health_probe<B>(req: &Request<B>) -> bool {
    req.method() == Method::GET && req.uri().path() == HEALTH_PATH
}

/// The fixed response for a health probe.
pub fn health_response() -> Response {
    (StatusCode::OK, HEALTH_BODY).into_response()
}
