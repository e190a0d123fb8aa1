//! Edge request-interception gateway.
//!
//! Sits in front of a web application and, for every request, resolves the
//! caller's session, classifies the route, and decides whether to let the
//! request through, redirect it to sign-in, or let it through with an
//! upgrade flag. Every response gets a security header set built around a
//! fresh CSP nonce.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;
pub mod session;

pub use config::schema::GatewayConfig;
pub use gateway::Gateway;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
