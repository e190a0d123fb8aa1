//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::RouteTier;

/// Root configuration for the edge gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Deployment environment; controls HSTS and CSP strictness.
    pub environment: Environment,

    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Upstream application that allowed requests are forwarded to.
    pub upstream: UpstreamConfig,

    /// Route tier table.
    pub routes: RouteTableConfig,

    /// Session credential handling and verification.
    pub session: SessionConfig,

    /// Identity provider used to verify credentials.
    pub identity: IdentityConfig,

    /// Gateway decision settings.
    pub gateway: DecisionConfig,

    /// Security header policy.
    pub security: SecurityConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Environment::Local)
    }
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "development" | "dev" => Ok(Environment::Local),
            "staging" => Ok(Environment::Staging),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(format!("unknown environment '{}'", other)),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Upstream application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upstream address (e.g., "127.0.0.1:3000").
    pub address: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Route tier table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteTableConfig {
    /// Tier applied to safe-method (GET, HEAD, OPTIONS, TRACE) requests no rule matches.
    pub default_tier: RouteTier,

    /// Tier applied to mutating requests no rule matches.
    pub mutating_default_tier: RouteTier,

    /// Prefix rules. Longest matching prefix wins.
    pub rules: Vec<RouteRuleConfig>,
}

impl Default for RouteTableConfig {
    fn default() -> Self {
        Self {
            default_tier: RouteTier::Public,
            mutating_default_tier: RouteTier::AuthenticatedOnly,
            rules: vec![
                RouteRuleConfig::new("/create-post", RouteTier::AuthenticatedOnly),
                RouteRuleConfig::new("/my/posts", RouteTier::AuthenticatedOnly),
                RouteRuleConfig::new("/my/favorites", RouteTier::AnonymousAllowed),
            ],
        }
    }
}

/// A single prefix → tier rule.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteRuleConfig {
    /// Path prefix, matched on segment boundaries.
    pub prefix: String,

    /// Protection tier for matching paths.
    pub tier: RouteTier,

    /// Restrict the rule to these HTTP methods (all methods when empty).
    #[serde(default)]
    pub methods: Vec<String>,
}

impl RouteRuleConfig {
    pub fn new(prefix: impl Into<String>, tier: RouteTier) -> Self {
        Self {
            prefix: prefix.into(),
            tier,
            methods: Vec::new(),
        }
    }
}

/// Session credential configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session credential.
    pub cookie_name: String,

    /// Accept `Authorization: Bearer` when the cookie is absent.
    pub accept_bearer: bool,

    /// Upper bound on a single provider verification call.
    pub verify_timeout_ms: u64,

    /// Dotted path of the claim naming the sign-in provider.
    pub provider_claim: String,

    /// Provider claim value that marks an anonymous session.
    pub anonymous_provider: String,

    /// Verification result cache.
    pub cache: CacheConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "auth_token".to_string(),
            accept_bearer: true,
            verify_timeout_ms: 2000,
            provider_claim: "firebase.sign_in_provider".to_string(),
            anonymous_provider: "anonymous".to_string(),
            cache: CacheConfig::default(),
        }
    }
}

/// Verification cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the verification cache.
    pub enabled: bool,

    /// Maximum lifetime of an entry in seconds.
    pub ttl_secs: u64,

    /// Maximum number of cached credentials.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 60,
            max_entries: 10_000,
        }
    }
}

/// Identity provider configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum IdentityConfig {
    /// Verify signed tokens locally.
    Jwt(JwtConfig),
    /// Delegate verification to an HTTP endpoint.
    Remote(RemoteConfig),
}

impl Default for IdentityConfig {
    fn default() -> Self {
        IdentityConfig::Jwt(JwtConfig::default())
    }
}

/// Signing algorithm accepted by the JWT provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum JwtAlgorithm {
    #[default]
    HS256,
    RS256,
}

/// Local JWT verification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtConfig {
    /// Signing algorithm.
    pub algorithm: JwtAlgorithm,

    /// Shared secret for HS256.
    pub secret: String,

    /// PEM file holding the RS256 public key.
    pub public_key_path: Option<String>,

    /// Expected `iss` claim.
    pub issuer: Option<String>,

    /// Expected `aud` claim.
    pub audience: Option<String>,

    /// Clock skew tolerance in seconds.
    pub leeway_secs: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            algorithm: JwtAlgorithm::HS256,
            secret: String::new(),
            public_key_path: None,
            issuer: None,
            audience: None,
            leeway_secs: 30,
        }
    }
}

/// Remote verification endpoint settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    /// Verification endpoint URL.
    pub url: String,
}

/// Gateway decision settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// Redirect target for unauthenticated access to protected routes.
    pub login_redirect: String,

    /// Response header carrying the upgrade flag.
    pub upgrade_header: String,

    /// Response header hinting at background anonymous sign-in.
    pub bootstrap_header: String,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            login_redirect: "/?auth=1".to_string(),
            upgrade_header: "x-auth-upgrade".to_string(),
            bootstrap_header: "x-auth-bootstrap".to_string(),
        }
    }
}

/// Security header policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Origins the browser may fetch from (`connect-src`).
    pub api_origins: Vec<String>,

    /// WebSocket origins the browser may connect to (`connect-src`).
    pub websocket_origins: Vec<String>,

    /// Random bytes per CSP nonce.
    pub nonce_bytes: usize,

    /// HSTS max-age in seconds.
    pub hsts_max_age_secs: u64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            api_origins: Vec::new(),
            websocket_origins: Vec::new(),
            nonce_bytes: 16,
            hsts_max_age_secs: 63_072_000, // two years
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Log format; derived from the environment when unset.
    pub log_format: Option<LogFormat>,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "edge_gateway=info,tower_http=info".to_string(),
            log_format: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
