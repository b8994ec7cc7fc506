//! Outbound HTTP client with a bounded timeout.
//!
//! # Responsibilities
//! - Issue the outbound request against the fixed upstream target
//! - Buffer the full upstream response
//! - Enforce a single timeout across connect and response receipt
//!
//! # Design Decisions
//! - One budget covers both phases combined, not each independently
//! - Dropping the in-flight future (client disconnect) abandons the
//!   upstream call; the connector's sockets are bounded by the same budget

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::proxy::error::ForwardError;

/// A fully buffered upstream response. Owned transiently by the relay for
/// the duration of one request.
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// HTTP client wrapper enforcing the forwarding timeout.
#[derive(Clone)]
pub struct Forwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }

    /// Send `request` to the upstream. The timeout covers connection
    /// establishment plus receipt of the full response body; expiry is
    /// reported as [`ForwardError::Timeout`].
    pub async fn send(&self, request: Request<Body>) -> Result<UpstreamResponse, ForwardError> {
        match tokio::time::timeout(self.timeout, self.dispatch(request)).await {
            Ok(result) => result,
            Err(_) => Err(ForwardError::Timeout(self.timeout)),
        }
    }

    async fn dispatch(&self, request: Request<Body>) -> Result<UpstreamResponse, ForwardError> {
        let response = self.client.request(request).await?;
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), usize::MAX)
            .await
            .map_err(ForwardError::Body)?;

        Ok(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}
