//! Verification failures.

use std::time::Duration;

use thiserror::Error;

/// Why a present credential could not be turned into a session.
///
/// Every variant is recovered by the gateway the same way: the request is
/// treated as having no session and the credential is cleared. They differ
/// in how loudly they are logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// Malformed, expired, revoked, or wrongly signed.
    #[error("credential invalid: {0}")]
    Invalid(String),

    /// The provider did not answer in time.
    #[error("verification timed out after {0:?}")]
    Timeout(Duration),

    /// The provider answered with something other than a verdict.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl VerificationError {
    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            VerificationError::Invalid(_) => "invalid",
            VerificationError::Timeout(_) => "timeout",
            VerificationError::Unavailable(_) => "unavailable",
        }
    }
}

/// Problems building an identity provider from configuration.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("failed to read key file {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid key material: {0}")]
    Key(#[from] jsonwebtoken::errors::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
