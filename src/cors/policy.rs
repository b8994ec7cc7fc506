//! Per-request cross-origin header computation.
//!
//! # Responsibilities
//! - Decide whether an `Origin` value is allow-listed (exact match)
//! - Compute the response headers to attach to every proxied response
//! - Short-circuit preflight requests before any forwarding

use std::collections::HashSet;

use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization, X-Requested-With";

/// Fixed, process-wide set of literal origins granted the credentialed
/// allow-origin header. Read-only after initialization.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed: HashSet<String>,
}

impl CorsPolicy {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: origins.into_iter().map(Into::into).collect(),
        }
    }

    /// Compute the headers to attach for a request's `Origin` value.
    ///
    /// Absence of an Origin header is valid input: the static headers are
    /// still emitted, the allow-origin header is not.
    pub fn headers_for(&self, origin: Option<&HeaderValue>) -> CorsHeaders {
        let allow_origin = origin
            .filter(|value| {
                value
                    .to_str()
                    .map(|origin| self.allowed.contains(origin))
                    .unwrap_or(false)
            })
            .cloned();
        CorsHeaders { allow_origin }
    }
}

/// Response headers computed by the policy for one request.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    allow_origin: Option<HeaderValue>,
}

impl CorsHeaders {
    /// Overlay the cross-origin headers, overwriting any same-named
    /// headers already present.
    pub fn apply(&self, headers: &mut HeaderMap) {
        if let Some(origin) = &self.allow_origin {
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        }
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }

    /// The origin echoed back, if the request's origin was allow-listed.
    pub fn allow_origin(&self) -> Option<&HeaderValue> {
        self.allow_origin.as_ref()
    }
}

/// Build the preflight short-circuit response: 204, the computed headers,
/// and an empty body. Preflights never reach the upstream.
pub fn preflight_response(cors: &CorsHeaders) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    cors.apply(response.headers_mut());
    response
}
