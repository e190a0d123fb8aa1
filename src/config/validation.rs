//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, nonce length, addresses)
//! - Check identity provider settings are usable for the environment
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - Route table structure is checked when the table is built (see `routing`)

use std::net::SocketAddr;

use axum::http::HeaderName;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, IdentityConfig, JwtAlgorithm};

/// Minimum nonce entropy: 128 bits.
pub const MIN_NONCE_BYTES: usize = 16;

/// Minimum HS256 secret length accepted outside local environments.
pub const MIN_SECRET_LEN: usize = 32;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("security.nonce_bytes: {0} is below the minimum of {min}", min = MIN_NONCE_BYTES)]
    NonceTooShort(usize),

    #[error("{field}: invalid origin '{value}'")]
    InvalidOrigin { field: &'static str, value: String },

    #[error("{field}: '{value}' is not a valid header name")]
    InvalidHeaderName { field: &'static str, value: String },

    #[error("gateway.login_redirect: must be an absolute path, got '{0}'")]
    InvalidLoginRedirect(String),

    #[error("session.cookie_name: '{0}' is not a valid cookie name")]
    InvalidCookieName(String),

    #[error("identity: {0}")]
    Identity(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    check_address(&mut errors, "upstream.address", &config.upstream.address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.request_secs" });
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::Zero { field: "timeouts.connect_secs" });
    }
    if config.session.verify_timeout_ms == 0 {
        errors.push(ValidationError::Zero { field: "session.verify_timeout_ms" });
    }
    if config.session.cache.enabled {
        if config.session.cache.ttl_secs == 0 {
            errors.push(ValidationError::Zero { field: "session.cache.ttl_secs" });
        }
        if config.session.cache.max_entries == 0 {
            errors.push(ValidationError::Zero { field: "session.cache.max_entries" });
        }
    }

    if config.security.nonce_bytes < MIN_NONCE_BYTES {
        errors.push(ValidationError::NonceTooShort(config.security.nonce_bytes));
    }
    for origin in &config.security.api_origins {
        check_origin(&mut errors, "security.api_origins", origin, &["http", "https"]);
    }
    for origin in &config.security.websocket_origins {
        check_origin(&mut errors, "security.websocket_origins", origin, &["ws", "wss"]);
    }

    check_header_name(&mut errors, "gateway.upgrade_header", &config.gateway.upgrade_header);
    check_header_name(&mut errors, "gateway.bootstrap_header", &config.gateway.bootstrap_header);
    if !config.gateway.login_redirect.starts_with('/') || config.gateway.login_redirect.starts_with("//") {
        errors.push(ValidationError::InvalidLoginRedirect(config.gateway.login_redirect.clone()));
    }

    let cookie = &config.session.cookie_name;
    if cookie.is_empty() || !cookie.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        errors.push(ValidationError::InvalidCookieName(cookie.clone()));
    }

    match &config.identity {
        IdentityConfig::Jwt(jwt) => match jwt.algorithm {
            JwtAlgorithm::HS256 => {
                if jwt.secret.is_empty() {
                    errors.push(ValidationError::Identity("jwt secret is required for HS256".into()));
                } else if !config.environment.is_local() && jwt.secret.len() < MIN_SECRET_LEN {
                    errors.push(ValidationError::Identity(format!(
                        "jwt secret must be at least {} characters outside local",
                        MIN_SECRET_LEN
                    )));
                }
            }
            JwtAlgorithm::RS256 => {
                if jwt.public_key_path.is_none() {
                    errors.push(ValidationError::Identity("public_key_path is required for RS256".into()));
                }
            }
        },
        IdentityConfig::Remote(remote) => {
            if url::Url::parse(&remote.url).is_err() {
                errors.push(ValidationError::Identity(format!("invalid verification url '{}'", remote.url)));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress { field, value: value.to_string() });
    }
}

fn check_origin(errors: &mut Vec<ValidationError>, field: &'static str, value: &str, schemes: &[&str]) {
    let valid = url::Url::parse(value)
        .map(|u| schemes.contains(&u.scheme()) && u.host_str().is_some())
        .unwrap_or(false);
    if !valid {
        errors.push(ValidationError::InvalidOrigin { field, value: value.to_string() });
    }
}

fn check_header_name(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if HeaderName::from_bytes(value.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeaderName { field, value: value.to_string() });
    }
}
