//! Observability subsystem.
//!
//! Logging only: the gateway's diagnostics are structured log lines (one
//! per inbound request, one per forward, one per relay or failure). There
//! is no metrics endpoint.

pub mod logging;
