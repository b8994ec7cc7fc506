//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the
//! gateway. All types derive Serde traits for deserialization from config
//! files. Defaults mirror the deployment this gateway fronts: a local Vite
//! dev server plus the hosted frontend, proxying to the backend API.

use serde::{Deserialize, Serialize};

/// Root configuration for the CORS gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream target and public path prefix.
    pub upstream: UpstreamConfig,

    /// Cross-origin allow-list.
    pub cors: CorsConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3001".to_string(),
        }
    }
}

/// Upstream target configuration.
///
/// The target is fixed for the process lifetime; it is never derived from
/// the inbound request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (host:port, plain HTTP only).
    pub address: String,

    /// Public path prefix stripped before forwarding.
    pub api_prefix: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "154.26.136.133:10025".to_string(),
            api_prefix: "/api".to_string(),
        }
    }
}

/// Cross-origin allow-list configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Literal origin strings granted the credentialed allow-origin header.
    /// Matched exactly against the request's `Origin` value.
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://154.26.136.133:7777".to_string(),
            ],
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Single upstream budget in milliseconds, covering connection
    /// establishment plus full response receipt.
    pub upstream_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { upstream_ms: 30_000 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
