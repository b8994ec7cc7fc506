//! Cross-origin policy subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request (Origin header)
//!     → policy.rs (allow-list check, header computation)
//!     → CorsHeaders (overlaid onto every proxied response)
//!
//! OPTIONS requests short-circuit here with 204 + headers,
//! before any body read or forwarding.
//! ```
//!
//! # Design Decisions
//! - Allow-list is exact string match, frozen at startup
//! - An unmatched origin is a silent policy outcome, not an error;
//!   the browser enforces the block, the gateway still relays

pub mod policy;

pub use policy::{preflight_response, CorsHeaders, CorsPolicy};
