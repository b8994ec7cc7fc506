//! Inbound body buffering and classification.
//!
//! # Responsibilities
//! - Buffer the request body fully before forwarding begins
//! - Enforce the configured body size limit
//! - Parse POST/PUT bodies into structured form for re-serialization
//!
//! # Design Decisions
//! - POST/PUT bodies must parse as JSON; form-encoded bodies are decoded
//!   into a JSON object. Anything else is rejected before forwarding —
//!   the upstream never sees an unparsed body on these methods
//! - Other methods carry their bytes through untouched

use axum::body::{Body, Bytes};
use axum::http::{header, request::Parts, Method};
use serde_json::{Map, Value};
use thiserror::Error;

/// A fully buffered request body, classified for forwarding.
#[derive(Debug, Clone)]
pub enum ForwardPayload {
    /// No body bytes.
    Empty,
    /// Bytes relayed untouched (non-POST/PUT methods).
    Raw(Bytes),
    /// Structured body, re-emitted as canonical JSON by the forwarder.
    Json(Value),
}

impl ForwardPayload {
    /// Pretty-printed dump of a structured body for the request log.
    pub fn dump(&self) -> Option<String> {
        match self {
            ForwardPayload::Json(value) => serde_json::to_string_pretty(value).ok(),
            _ => None,
        }
    }
}

/// Rejection reasons surfaced before any forwarding is attempted.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("request body exceeds the {0} byte limit")]
    TooLarge(usize),
    #[error("request body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Buffer and classify an inbound body.
///
/// POST and PUT bodies are parsed into structured form here; the
/// forwarder re-emits them as canonical JSON text rather than relaying
/// the original bytes.
pub async fn read_payload(
    parts: &Parts,
    body: Body,
    limit: usize,
) -> Result<ForwardPayload, PayloadError> {
    let bytes = match axum::body::to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(_) => return Err(PayloadError::TooLarge(limit)),
    };

    if bytes.is_empty() {
        return Ok(ForwardPayload::Empty);
    }
    if parts.method != Method::POST && parts.method != Method::PUT {
        return Ok(ForwardPayload::Raw(bytes));
    }
    if is_form_encoded(parts) {
        return Ok(ForwardPayload::Json(decode_form(&bytes)));
    }
    Ok(ForwardPayload::Json(serde_json::from_slice(&bytes)?))
}

fn is_form_encoded(parts: &Parts) -> bool {
    parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/x-www-form-urlencoded"))
        .unwrap_or(false)
}

/// Decode a form-encoded body into a JSON object, last value winning for
/// repeated keys.
fn decode_form(bytes: &[u8]) -> Value {
    let mut object = Map::new();
    for (key, value) in url::form_urlencoded::parse(bytes) {
        object.insert(key.into_owned(), Value::String(value.into_owned()));
    }
    Value::Object(object)
}
