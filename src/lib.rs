//! CORS Gateway Library
//!
//! A reverse-proxy gateway that injects permissive cross-origin headers on
//! behalf of a backend API server and rewrites the public `/api` path
//! space into the backend's native one.

pub mod config;
pub mod cors;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use config::schema::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
