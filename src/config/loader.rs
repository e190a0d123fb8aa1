//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Environment, GatewayConfig, IdentityConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Overrides the deployment environment.
pub const ENV_ENVIRONMENT: &str = "EDGE_GATEWAY_ENVIRONMENT";
/// Overrides the HS256 secret so it never has to live in the config file.
pub const ENV_JWT_SECRET: &str = "EDGE_GATEWAY_JWT_SECRET";
/// Overrides the upstream application address.
pub const ENV_UPSTREAM: &str = "EDGE_GATEWAY_UPSTREAM";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid {var}: {0}", var = ENV_ENVIRONMENT)]
    Environment(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content, |key| std::env::var(key).ok())
}

/// Parse, apply overrides, and validate configuration text.
///
/// `lookup` resolves override variables; the process environment in production.
pub fn parse_config<F>(content: &str, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config: GatewayConfig = toml::from_str(content)?;
    apply_overrides(&mut config, lookup)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn apply_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(env) = lookup(ENV_ENVIRONMENT) {
        config.environment = env.parse::<Environment>().map_err(ConfigError::Environment)?;
    }

    if let Some(secret) = lookup(ENV_JWT_SECRET) {
        match &mut config.identity {
            IdentityConfig::Jwt(jwt) => jwt.secret = secret,
            IdentityConfig::Remote(_) => {
                tracing::warn!("{} set but identity provider is remote; ignoring", ENV_JWT_SECRET);
            }
        }
    }

    if let Some(upstream) = lookup(ENV_UPSTREAM) {
        config.upstream.address = upstream;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteTier;

    const SAMPLE: &str = r#"
        environment = "staging"

        [listener]
        bind_address = "127.0.0.1:8443"

        [routes]
        default_tier = "public"
        mutating_default_tier = "anonymous_allowed"

        [[routes.rules]]
        prefix = "/my/posts"
        tier = "authenticated_only"

        [[routes.rules]]
        prefix = "/api/posts"
        tier = "anonymous_allowed"
        methods = ["POST", "PUT"]

        [identity]
        kind = "jwt"
        secret = "0123456789abcdef0123456789abcdef"
        issuer = "https://securetoken.google.com/demo"

        [security]
        api_origins = ["https://api.example.com"]
    "#;

    #[test]
    fn test_parse_sample() {
        let config = parse_config(SAMPLE, |_| None).unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.listener.bind_address, "127.0.0.1:8443");
        assert_eq!(config.routes.rules.len(), 2);
        assert_eq!(config.routes.rules[1].tier, RouteTier::AnonymousAllowed);
        assert_eq!(config.routes.mutating_default_tier, RouteTier::AnonymousAllowed);
        assert_eq!(config.routes.rules[1].methods, vec!["POST", "PUT"]);
        // Untouched sections keep their defaults.
        assert_eq!(config.session.cookie_name, "auth_token");
        assert_eq!(config.gateway.login_redirect, "/?auth=1");
        match config.identity {
            IdentityConfig::Jwt(jwt) => {
                assert_eq!(jwt.issuer.as_deref(), Some("https://securetoken.google.com/demo"));
                assert_eq!(jwt.leeway_secs, 30);
            }
            other => panic!("unexpected identity config: {:?}", other),
        }
    }

    #[test]
    fn test_env_overrides() {
        let config = parse_config(SAMPLE, |key| match key {
            ENV_ENVIRONMENT => Some("production".into()),
            ENV_UPSTREAM => Some("10.0.0.5:3000".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.upstream.address, "10.0.0.5:3000");
    }

    #[test]
    fn test_secret_override_satisfies_validation() {
        let content = r#"
            [identity]
            kind = "jwt"
        "#;
        assert!(matches!(
            parse_config(content, |_| None),
            Err(ConfigError::Validation(_))
        ));

        let config = parse_config(content, |key| {
            (key == ENV_JWT_SECRET).then(|| "local-secret".to_string())
        });
        assert!(config.is_ok());
    }

    #[test]
    fn test_bad_environment_override() {
        let err = parse_config(SAMPLE, |key| {
            (key == ENV_ENVIRONMENT).then(|| "moon".to_string())
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Environment(_)));
    }

    #[test]
    fn test_shipped_config_is_valid() {
        let config = parse_config(include_str!("../../gateway.toml"), |_| None).unwrap();
        assert_eq!(config.environment, Environment::Local);
        assert_eq!(config.routes.rules.len(), 3);
    }

    #[test]
    fn test_unknown_tier_is_parse_error() {
        let content = r#"
            [[routes.rules]]
            prefix = "/admin"
            tier = "superuser"
        "#;
        assert!(matches!(parse_config(content, |_| None), Err(ConfigError::Parse(_))));
    }
}
