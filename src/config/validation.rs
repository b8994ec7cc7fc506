//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate address syntax for the listener and the upstream target
//! - Enforce the allow-list floor of two literal origins
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::uri::Authority;

use crate::config::schema::GatewayConfig;

/// A single semantic violation in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    InvalidBindAddress(String),
    InvalidUpstreamAddress(String),
    TooFewOrigins(usize),
    InvalidOrigin(String),
    InvalidPrefix(String),
    ZeroTimeout,
    ZeroBodyLimit,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "bind address '{}' is not a valid socket address", addr)
            }
            ValidationError::InvalidUpstreamAddress(addr) => {
                write!(f, "upstream address '{}' is not a valid host:port authority", addr)
            }
            ValidationError::TooFewOrigins(count) => {
                write!(f, "allow-list needs at least two origins, got {}", count)
            }
            ValidationError::InvalidOrigin(origin) => {
                write!(
                    f,
                    "origin '{}' must be a scheme://host[:port] literal without a trailing slash",
                    origin
                )
            }
            ValidationError::InvalidPrefix(prefix) => {
                write!(f, "public prefix '{}' must start with '/'", prefix)
            }
            ValidationError::ZeroTimeout => write!(f, "upstream timeout must be greater than zero"),
            ValidationError::ZeroBodyLimit => write!(f, "body size limit must be greater than zero"),
        }
    }
}

/// Validate semantic constraints on a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.address.parse::<Authority>().is_err() {
        errors.push(ValidationError::InvalidUpstreamAddress(
            config.upstream.address.clone(),
        ));
    }

    if !config.upstream.api_prefix.starts_with('/') {
        errors.push(ValidationError::InvalidPrefix(
            config.upstream.api_prefix.clone(),
        ));
    }

    if config.cors.allowed_origins.len() < 2 {
        errors.push(ValidationError::TooFewOrigins(
            config.cors.allowed_origins.len(),
        ));
    }
    for origin in &config.cors.allowed_origins {
        if !is_origin_literal(origin) {
            errors.push(ValidationError::InvalidOrigin(origin.clone()));
        }
    }

    if config.timeouts.upstream_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Browsers send `Origin` as scheme://host[:port] with no path and no
/// trailing slash; the allow-list must hold the same literal shape for
/// exact matching to ever succeed.
fn is_origin_literal(origin: &str) -> bool {
    let rest = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"));
    match rest {
        Some(rest) => !rest.is_empty() && !rest.contains('/'),
        None => false,
    }
}
