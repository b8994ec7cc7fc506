//! HTTP surface subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum routes, middleware, dispatch)
//!     → request.rs (buffer body, classify payload)
//!     → [proxy pipeline transforms and forwards]
//!     → server.rs (relayed response or synthesized failure reply)
//! ```

pub mod request;
pub mod server;

pub use server::{AppState, GatewayServer};
