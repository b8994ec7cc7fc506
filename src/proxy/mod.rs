//! Request forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (path, headers, buffered body)
//!     → rewrite.rs (strip public prefix)
//!     → pipeline.rs (build outbound request)
//!     → forwarder.rs (send to upstream, bounded timeout)
//!     → pipeline.rs (relay upstream response / synthesize 502)
//! ```
//!
//! # Design Decisions
//! - Pipeline hooks are explicit trait methods, substitutable in tests
//! - Bodies are fully buffered; nothing is written to the client until
//!   the outcome of the upstream call is known
//! - Exactly one upstream attempt per request, no retries

pub mod error;
pub mod forwarder;
pub mod pipeline;
pub mod rewrite;

pub use error::{ErrorEnvelope, ForwardError};
pub use forwarder::{Forwarder, UpstreamResponse};
pub use pipeline::{GatewayPipeline, ProxyPipeline};
pub use rewrite::PathRewriter;
