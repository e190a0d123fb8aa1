//! Network layer subsystem.
//!
//! TLS is optional: when `listener.tls` is set the server terminates TLS
//! itself via rustls, otherwise it serves plain HTTP behind whatever edge
//! terminates TLS in front of it.

pub mod tls;

pub use tls::{load_tls_config, TlsError};
