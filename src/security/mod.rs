//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → nonce.rs (draw fresh random bytes from the injected source)
//!     → headers.rs (CSP with nonce, nosniff, frame deny, HSTS outside local)
//!     → HeaderSet applied to the response
//!     → CspNonce handed to the application via request extensions
//! ```
//!
//! # Design Decisions
//! - One nonce per response, never reused, never logged
//! - Environment decides HSTS and CSP strictness
//! - Random source is a parameter, not a hidden global

pub mod headers;
pub mod nonce;

pub use headers::{HeaderSet, SecurityHeaderPolicy};
pub use nonce::{CspNonce, FixedNonceSource, NonceSource, OsNonceSource};
