//! Shared gateway state.

use std::sync::Arc;

use axum::http::{HeaderMap, Method};

use crate::gateway::decision::{DecisionEngine, GatewayDecision};
use crate::routing::{RouteTable, RouteTier};
use crate::security::{NonceSource, OsNonceSource, SecurityHeaderPolicy};
use crate::session::{CredentialExtractor, CredentialSource, Session, SessionVerifier, VerificationError};

/// Verifier outcome as the gateway sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub session: Session,
    /// The request carried a cookie credential that must be expired.
    pub clear_credential: bool,
}

/// Everything the gateway needs per request. Cheap to clone; all parts are
/// immutable or internally synchronized.
#[derive(Clone)]
pub struct Gateway {
    routes: Arc<RouteTable>,
    verifier: SessionVerifier,
    extractor: CredentialExtractor,
    engine: DecisionEngine,
    policy: SecurityHeaderPolicy,
    nonce_source: Arc<dyn NonceSource>,
}

impl Gateway {
    pub fn new(
        routes: Arc<RouteTable>,
        verifier: SessionVerifier,
        extractor: CredentialExtractor,
        engine: DecisionEngine,
        policy: SecurityHeaderPolicy,
    ) -> Self {
        Self {
            routes,
            verifier,
            extractor,
            engine,
            policy,
            nonce_source: Arc::new(OsNonceSource),
        }
    }

    /// Replace the random source used for CSP nonces.
    pub fn with_nonce_source(mut self, source: Arc<dyn NonceSource>) -> Self {
        self.nonce_source = source;
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn verifier(&self) -> &SessionVerifier {
        &self.verifier
    }

    pub fn extractor(&self) -> &CredentialExtractor {
        &self.extractor
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    pub fn policy(&self) -> &SecurityHeaderPolicy {
        &self.policy
    }

    pub fn nonce_source(&self) -> &dyn NonceSource {
        self.nonce_source.as_ref()
    }

    /// Extract and verify the request's credential. Never fails: anything
    /// that cannot be verified becomes `Session::none()`.
    pub async fn resolve(&self, headers: &HeaderMap) -> Resolution {
        let credential = self.extractor.extract(headers);
        let result = self.verifier.verify(credential.as_ref().map(|c| c.value.as_str())).await;

        match result {
            Ok(session) => Resolution {
                session,
                clear_credential: false,
            },
            Err(e) => {
                match &e {
                    VerificationError::Invalid(reason) => {
                        tracing::debug!(reason = %reason, "Discarding invalid credential");
                    }
                    VerificationError::Timeout(after) => {
                        tracing::error!(timeout = ?after, "Identity provider timed out; treating request as signed out");
                    }
                    VerificationError::Unavailable(reason) => {
                        tracing::warn!(reason = %reason, "Identity provider unavailable; treating request as signed out");
                    }
                }
                Resolution {
                    session: Session::none(),
                    clear_credential: credential.map(|c| c.source) == Some(CredentialSource::Cookie),
                }
            }
        }
    }

    /// Classify and decide for an already-resolved session.
    pub fn evaluate(&self, method: &Method, path: &str, session: &Session) -> (RouteTier, GatewayDecision) {
        let tier = self.routes.classify_request(method, path);
        (tier, self.engine.decide(session, tier))
    }
}
