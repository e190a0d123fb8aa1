//! Session verification subsystem.
//!
//! # Data Flow
//! ```text
//! Request headers
//!     → credential.rs (cookie, optional bearer fallback)
//!     → verifier.rs (absent → None; cache lookup; provider call with timeout)
//!         → provider/ (JWT locally, or remote HTTP endpoint)
//!         → cache.rs (store successful verdicts, bounded by credential expiry)
//!     → Session { kind: None | Anonymous | Authenticated, .. }
//!       or VerificationError { Invalid | Timeout | Unavailable }
//! ```
//!
//! # Design Decisions
//! - Sessions are request-scoped; nothing is persisted here
//! - The sign-in provider claim is turned into `SessionKind` exactly once
//! - A credential that cannot be verified is never trusted

pub mod cache;
pub mod credential;
pub mod error;
pub mod model;
pub mod provider;
pub mod verifier;

pub use cache::VerificationCache;
pub use credential::{Credential, CredentialExtractor, CredentialSource};
pub use error::{ProviderError, VerificationError};
pub use model::{Session, SessionKind};
pub use provider::{IdentityProvider, VerifiedIdentity};
pub use verifier::SessionVerifier;
