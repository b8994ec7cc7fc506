//! Request/response transformation pipeline.
//!
//! # Responsibilities
//! - Build the outbound request (rewritten path, header overrides, body)
//! - Relay the upstream response with cross-origin headers overlaid
//! - Synthesize the structured 502 reply when forwarding fails
//!
//! # Design Decisions
//! - The three hooks are trait methods so tests can exercise them without
//!   a live upstream
//! - POST and PUT bodies are re-emitted as canonical JSON text, never
//!   relayed byte-for-byte; other methods pass their bytes through
//! - Hop-by-hop headers are stripped from relayed responses; the body is
//!   buffered, so upstream transfer framing must not leak to the client

use axum::{
    body::Body,
    http::{
        header::{self, HeaderName, HeaderValue},
        request::Parts,
        uri::{Authority, Scheme},
        Method, Request, StatusCode, Uri, Version,
    },
    response::{IntoResponse, Response},
    Json,
};

use crate::cors::CorsHeaders;
use crate::http::request::ForwardPayload;
use crate::proxy::error::{ErrorEnvelope, ForwardError};
use crate::proxy::forwarder::UpstreamResponse;
use crate::proxy::rewrite::PathRewriter;

/// Hook points for the proxied request lifecycle.
///
/// The production implementation is [`GatewayPipeline`]; tests substitute
/// their own to isolate the dispatch path from a live upstream.
pub trait ProxyPipeline: Send + Sync {
    /// Build the outbound request for the fixed upstream target.
    fn transform_request(
        &self,
        parts: &Parts,
        payload: &ForwardPayload,
    ) -> Result<Request<Body>, ForwardError>;

    /// Relay an upstream response to the client, overlaying `cors`.
    fn transform_response(
        &self,
        upstream: UpstreamResponse,
        cors: &CorsHeaders,
        inbound_uri: &Uri,
    ) -> Response;

    /// Synthesize the client-facing reply for a forwarding failure.
    fn handle_failure(
        &self,
        failure: &ForwardError,
        method: &Method,
        inbound_uri: &Uri,
        cors: &CorsHeaders,
    ) -> Response;
}

/// Production pipeline bound to one upstream authority.
pub struct GatewayPipeline {
    authority: Authority,
    rewriter: PathRewriter,
}

impl GatewayPipeline {
    pub fn new(authority: Authority, rewriter: PathRewriter) -> Self {
        Self { authority, rewriter }
    }
}

impl ProxyPipeline for GatewayPipeline {
    fn transform_request(
        &self,
        parts: &Parts,
        payload: &ForwardPayload,
    ) -> Result<Request<Body>, ForwardError> {
        let rewritten = self.rewriter.rewrite(parts.uri.path());
        let path_and_query = match parts.uri.query() {
            Some(query) => format!("{rewritten}?{query}"),
            None => rewritten.clone(),
        };

        tracing::debug!(
            method = %parts.method,
            url = %parts.uri,
            rewritten = %rewritten,
            "Forwarding request to upstream"
        );

        let uri = Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?;

        let mut request = Request::builder()
            .method(parts.method.clone())
            .uri(uri)
            .version(Version::HTTP_11)
            .body(Body::empty())?;

        for (name, value) in &parts.headers {
            if is_managed_request_header(name) {
                continue;
            }
            request.headers_mut().append(name.clone(), value.clone());
        }
        let host = HeaderValue::from_str(self.authority.as_str())
            .map_err(axum::http::Error::from)?;
        request.headers_mut().insert(header::HOST, host);
        request
            .headers_mut()
            .insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));

        match payload {
            ForwardPayload::Empty => {}
            ForwardPayload::Raw(bytes) => {
                request
                    .headers_mut()
                    .insert(header::CONTENT_LENGTH, HeaderValue::from(bytes.len()));
                *request.body_mut() = Body::from(bytes.clone());
            }
            ForwardPayload::Json(value) => {
                let data = serde_json::to_vec(value)?;
                request.headers_mut().insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                request
                    .headers_mut()
                    .insert(header::CONTENT_LENGTH, HeaderValue::from(data.len()));
                *request.body_mut() = Body::from(data);
            }
        }

        Ok(request)
    }

    fn transform_response(
        &self,
        upstream: UpstreamResponse,
        cors: &CorsHeaders,
        inbound_uri: &Uri,
    ) -> Response {
        tracing::debug!(
            status = %upstream.status,
            url = %inbound_uri,
            "Relaying upstream response"
        );

        let mut response = Response::new(Body::from(upstream.body));
        *response.status_mut() = upstream.status;
        for (name, value) in &upstream.headers {
            if is_hop_by_hop(name) {
                continue;
            }
            response.headers_mut().append(name.clone(), value.clone());
        }
        cors.apply(response.headers_mut());
        response
    }

    fn handle_failure(
        &self,
        failure: &ForwardError,
        method: &Method,
        inbound_uri: &Uri,
        cors: &CorsHeaders,
    ) -> Response {
        tracing::error!(
            error = %failure,
            url = %inbound_uri,
            method = %method,
            "Upstream request failed"
        );

        let envelope = ErrorEnvelope::bad_gateway(failure);
        let mut response = (StatusCode::BAD_GATEWAY, Json(envelope)).into_response();
        cors.apply(response.headers_mut());
        response
    }
}

/// Headers the forwarder owns; inbound values for these are discarded.
fn is_managed_request_header(name: &HeaderName) -> bool {
    name == header::HOST || name == header::CONNECTION || name == header::CONTENT_LENGTH
}

/// Hop-by-hop headers (RFC 9110 §7.6.1) describe the upstream connection,
/// not the relayed message.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cors::CorsPolicy;

    fn pipeline() -> GatewayPipeline {
        GatewayPipeline::new(
            "127.0.0.1:9999".parse().unwrap(),
            PathRewriter::new("/api"),
        )
    }

    fn parts(method: Method, uri: &str) -> Parts {
        let (parts, _) = Request::builder()
            .method(method)
            .uri(uri)
            .header("authorization", "Bearer token")
            .header("host", "gateway.local:3001")
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    fn cors() -> CorsHeaders {
        let origin = HeaderValue::from_static("http://localhost:5173");
        CorsPolicy::new(["http://localhost:5173", "http://other.example"])
            .headers_for(Some(&origin))
    }

    #[test]
    fn rewrites_path_and_preserves_query() {
        let outbound = pipeline()
            .transform_request(
                &parts(Method::GET, "/api/items/42?page=2&sort=name"),
                &ForwardPayload::Empty,
            )
            .unwrap();

        assert_eq!(
            outbound.uri().to_string(),
            "http://127.0.0.1:9999/items/42?page=2&sort=name"
        );
        assert_eq!(outbound.headers().get(header::HOST).unwrap(), "127.0.0.1:9999");
        assert_eq!(
            outbound.headers().get(header::CONNECTION).unwrap(),
            "keep-alive"
        );
        assert_eq!(
            outbound.headers().get("authorization").unwrap(),
            "Bearer token"
        );
    }

    #[tokio::test]
    async fn json_payload_is_reserialized_with_recomputed_length() {
        let payload = ForwardPayload::Json(serde_json::json!({"name": "x"}));
        let outbound = pipeline()
            .transform_request(&parts(Method::POST, "/api/items"), &payload)
            .unwrap();

        let expected = br#"{"name":"x"}"#;
        assert_eq!(
            outbound.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert_eq!(
            outbound
                .headers()
                .get(header::CONTENT_LENGTH)
                .unwrap()
                .to_str()
                .unwrap(),
            expected.len().to_string()
        );

        let body = axum::body::to_bytes(outbound.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], expected);
    }

    #[tokio::test]
    async fn raw_payload_passes_through_byte_exact() {
        let bytes = axum::body::Bytes::from_static(b"opaque \x00 bytes");
        let payload = ForwardPayload::Raw(bytes.clone());
        let outbound = pipeline()
            .transform_request(&parts(Method::PATCH, "/api/items/1"), &payload)
            .unwrap();

        let body = axum::body::to_bytes(outbound.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(body, bytes);
    }

    #[test]
    fn relay_strips_hop_by_hop_and_overlays_cors() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("text/plain"));
        headers.insert("transfer-encoding", HeaderValue::from_static("chunked"));
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("http://upstream.example"),
        );

        let upstream = UpstreamResponse {
            status: StatusCode::CREATED,
            headers,
            body: axum::body::Bytes::from_static(b"created"),
        };
        let response = pipeline().transform_response(
            upstream,
            &cors(),
            &"/api/items".parse::<Uri>().unwrap(),
        );

        assert_eq!(response.status(), StatusCode::CREATED);
        assert!(!response.headers().contains_key("transfer-encoding"));
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/plain"
        );
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:5173"
        );
    }

    #[tokio::test]
    async fn failure_becomes_structured_502_with_cors() {
        let failure = ForwardError::Timeout(std::time::Duration::from_millis(500));
        let response = pipeline().handle_failure(
            &failure,
            &Method::GET,
            &"/api/items".parse::<Uri>().unwrap(),
            &cors(),
        );

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let envelope: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(envelope["error"], "Bad Gateway - Target server error");
        assert_eq!(envelope["message"], "upstream did not respond within 500ms");
    }
}
