//! Structured logging initialization.
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level when set
//! - Installed once at startup; the log sink is append-only and safe for
//!   concurrent request tasks

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber from the configured log level.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("cors_gateway={log_level},tower_http={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
