//! Credential → Session.
//!
//! # Responsibilities
//! - Treat an absent credential as a normal `None` session
//! - Bound every provider call with a timeout
//! - Turn the provider's sign-in marker into a typed `SessionKind`, once
//! - Consult and fill the optional verification cache
//!
//! # Design Decisions
//! - Pure from the caller's point of view: no cookies are touched here
//! - Only successful verifications are cached
//! - Timeouts and provider failures are errors, never a trusted session

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::SessionConfig;
use crate::observability::metrics;
use crate::session::cache::VerificationCache;
use crate::session::error::VerificationError;
use crate::session::model::Session;
use crate::session::provider::{IdentityProvider, VerifiedIdentity};

/// Verifies session credentials against an identity provider.
#[derive(Clone)]
pub struct SessionVerifier {
    provider: Arc<dyn IdentityProvider>,
    cache: Option<VerificationCache>,
    timeout: Duration,
    anonymous_provider: String,
}

impl SessionVerifier {
    pub fn new(provider: Arc<dyn IdentityProvider>, timeout: Duration, anonymous_provider: impl Into<String>) -> Self {
        Self {
            provider,
            cache: None,
            timeout,
            anonymous_provider: anonymous_provider.into(),
        }
    }

    /// Build a verifier from the session configuration.
    pub fn from_config(provider: Arc<dyn IdentityProvider>, config: &SessionConfig) -> Self {
        let verifier = Self::new(
            provider,
            Duration::from_millis(config.verify_timeout_ms),
            config.anonymous_provider.clone(),
        );
        if config.cache.enabled {
            verifier.with_cache(VerificationCache::new(
                Duration::from_secs(config.cache.ttl_secs),
                config.cache.max_entries,
            ))
        } else {
            verifier
        }
    }

    pub fn with_cache(mut self, cache: VerificationCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&VerificationCache> {
        self.cache.as_ref()
    }

    /// Classify a request's credential.
    pub async fn verify(&self, credential: Option<&str>) -> Result<Session, VerificationError> {
        let Some(credential) = credential else {
            return Ok(Session::none());
        };
        if credential.trim().is_empty() {
            metrics::record_verification("invalid");
            return Err(VerificationError::Invalid("empty credential".into()));
        }

        if let Some(session) = self.cache.as_ref().and_then(|c| c.get(credential)) {
            return Ok(session);
        }

        let start = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, self.provider.verify(credential)).await {
            Ok(result) => result,
            Err(_) => Err(VerificationError::Timeout(self.timeout)),
        };
        metrics::record_verification_duration(start);

        match outcome {
            Ok(identity) => {
                let expires_at = identity.expires_at;
                let session = self.classify(identity);
                metrics::record_verification(session.kind().as_str());
                if let Some(cache) = &self.cache {
                    cache.insert(credential, session.clone(), expires_at);
                }
                Ok(session)
            }
            Err(e) => {
                metrics::record_verification(e.outcome());
                Err(e)
            }
        }
    }

    fn classify(&self, identity: VerifiedIdentity) -> Session {
        let anonymous = identity.provider.as_deref() == Some(self.anonymous_provider.as_str());
        if anonymous {
            Session::anonymous(identity.subject_id, identity.claims)
        } else {
            Session::authenticated(identity.subject_id, identity.claims)
        }
    }
}
