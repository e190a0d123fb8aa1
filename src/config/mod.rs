//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, apply EDGE_GATEWAY_* overrides)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → compiled into RouteTable / SessionVerifier / SecurityHeaderPolicy at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Secrets can come from the environment instead of the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CacheConfig, DecisionConfig, Environment, GatewayConfig, IdentityConfig, JwtAlgorithm,
    JwtConfig, ListenerConfig, LogFormat, ObservabilityConfig, RemoteConfig, RouteRuleConfig,
    RouteTableConfig, SecurityConfig, SessionConfig, TimeoutConfig, TlsConfig, UpstreamConfig,
};
pub use validation::ValidationError;
