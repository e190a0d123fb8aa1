//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, layers, graceful shutdown)
//!     → request.rs (assign / propagate x-request-id)
//!     → [gateway middleware decides]
//!     → upstream.rs (forward allowed requests to the application)
//!     → Send to client
//! ```

pub mod request;
pub mod server;
pub mod upstream;

pub use request::X_REQUEST_ID;
pub use server::{build_router, HttpServer};
pub use upstream::{forward_handler, Upstream};
