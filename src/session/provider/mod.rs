//! Identity provider seam.
//!
//! The gateway never interprets token formats itself; it hands the raw
//! credential to an [`IdentityProvider`] and consumes the resulting
//! [`VerifiedIdentity`]. Any provider with a token-verification primitive
//! and an "anonymous vs real" marker fits.

pub mod jwt;
pub mod remote;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{IdentityConfig, SessionConfig};
use crate::session::error::{ProviderError, VerificationError};

pub use jwt::JwtProvider;
pub use remote::RemoteProvider;

/// Claims key under which the sign-in provider is exposed in a session.
pub const SIGN_IN_PROVIDER_CLAIM: &str = "sign_in_provider";

/// What a provider vouches for after successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub subject_id: String,
    pub claims: BTreeMap<String, String>,
    /// Sign-in provider named by the credential (e.g. "anonymous", "google.com").
    pub provider: Option<String>,
    /// Credential expiry, seconds since the Unix epoch.
    pub expires_at: Option<u64>,
}

/// Verifies a raw credential.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, VerificationError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Build the configured provider.
pub fn from_config(
    identity: &IdentityConfig,
    session: &SessionConfig,
) -> Result<Arc<dyn IdentityProvider>, ProviderError> {
    let provider: Arc<dyn IdentityProvider> = match identity {
        IdentityConfig::Jwt(jwt) => Arc::new(JwtProvider::from_config(jwt, &session.provider_claim)?),
        IdentityConfig::Remote(remote) => Arc::new(RemoteProvider::from_config(
            remote,
            Duration::from_millis(session.verify_timeout_ms),
        )?),
    };
    tracing::info!(provider = provider.name(), "Identity provider configured");
    Ok(provider)
}
