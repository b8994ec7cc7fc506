//! Forwarding failure taxonomy and the structured 502 payload.
//!
//! # Design Decisions
//! - Timeout expiry is reported distinctly but handled identically to a
//!   connection failure
//! - Failures are mapped to a response before any byte reaches the
//!   client; responses are fully buffered, so a failure can never race a
//!   partially written reply
//! - No failure is fatal; the gateway keeps accepting requests

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use thiserror::Error;

/// Reasons a forwarded request can fail before a relayable response exists.
#[derive(Debug, Error)]
pub enum ForwardError {
    /// Connection establishment plus response receipt exceeded the budget.
    #[error("upstream did not respond within {}ms", .0.as_millis())]
    Timeout(Duration),

    /// Connection-level failure: refused, reset, or unresolvable host.
    #[error("{0}")]
    Connect(#[from] hyper_util::client::legacy::Error),

    /// The upstream accepted the request but its body could not be read.
    #[error("failed to read upstream body: {0}")]
    Body(#[source] axum::Error),

    /// The outbound request could not be constructed.
    #[error("invalid outbound request: {0}")]
    Request(#[from] axum::http::Error),

    /// The parsed request body could not be re-serialized.
    #[error("failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Structured failure payload returned to the client when the upstream
/// cannot be reached.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorEnvelope {
    /// Envelope for an unreachable or failed upstream. The timestamp is
    /// ISO-8601 UTC with millisecond precision.
    pub fn bad_gateway(failure: &ForwardError) -> Self {
        Self {
            error: "Bad Gateway - Target server error".to_string(),
            message: failure.to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
