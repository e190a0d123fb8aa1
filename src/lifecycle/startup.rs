//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated `GatewayConfig` into a ready `Gateway`
//! - Build the identity provider and route table exactly once
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Cookies are marked `Secure` outside the local environment

use std::sync::Arc;

use thiserror::Error;

use crate::config::{ConfigError, GatewayConfig};
use crate::gateway::{DecisionEngine, Gateway};
use crate::net::TlsError;
use crate::routing::{RouteTable, RouteTableError};
use crate::security::SecurityHeaderPolicy;
use crate::session::{provider, CredentialExtractor, ProviderError, SessionVerifier};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid route table: {0}")]
    RouteTable(#[from] RouteTableError),

    #[error("identity provider: {0}")]
    Provider(#[from] ProviderError),

    #[error("tls: {0}")]
    Tls(#[from] TlsError),

    #[error("invalid upstream address {address}: {reason}")]
    Upstream { address: String, reason: String },

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Assemble the gateway from configuration.
pub fn build_gateway(config: &GatewayConfig) -> Result<Gateway, StartupError> {
    let routes = RouteTable::from_config(&config.routes)?;
    tracing::info!(
        rules = routes.len(),
        default_tier = %routes.default_tier(),
        mutating_default_tier = %routes.mutating_default_tier(),
        "Route table loaded"
    );

    let provider = provider::from_config(&config.identity, &config.session)?;
    let verifier = SessionVerifier::from_config(provider, &config.session);
    let extractor = CredentialExtractor::from_config(&config.session, !config.environment.is_local());
    let engine = DecisionEngine::from_config(&config.gateway);
    let policy = SecurityHeaderPolicy::from_config(config.environment, &config.security);

    Ok(Gateway::new(Arc::new(routes), verifier, extractor, engine, policy))
}
