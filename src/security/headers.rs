//! Security response headers.
//!
//! # Responsibilities
//! - Attach nosniff / frame-deny / referrer headers to every response
//! - Attach HSTS outside local environments
//! - Build a Content-Security-Policy around a fresh per-response nonce
//!
//! # Design Decisions
//! - Pure given the environment and an injected random source
//! - The nonce is generated here and nowhere else; it is never cached
//! - Policy headers override whatever the application set

use axum::http::header::{
    CONTENT_SECURITY_POLICY, REFERRER_POLICY, STRICT_TRANSPORT_SECURITY, X_CONTENT_TYPE_OPTIONS,
    X_FRAME_OPTIONS,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::{Environment, SecurityConfig};
use crate::security::nonce::{CspNonce, NonceSource};

/// Used if the generated policy is somehow not a valid header value.
const FALLBACK_CSP: &str = "default-src 'self'; object-src 'none'; frame-ancestors 'none'";

/// Ordered header name → value mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderSet {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, replacing (in place) any existing value for `name`.
    pub fn insert(&mut self, name: HeaderName, value: HeaderValue) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.entries
            .iter()
            .find(|(n, _)| n.as_str().eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(n, v)| (n, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append all entries of `other`, replacing duplicates.
    pub fn extend(&mut self, other: HeaderSet) {
        for (name, value) in other.entries {
            self.insert(name, value);
        }
    }

    /// Write every entry into `headers`, overriding existing values.
    pub fn apply_to(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.entries {
            headers.insert(name.clone(), value.clone());
        }
    }
}

/// Environment-aware security header policy.
#[derive(Debug, Clone)]
pub struct SecurityHeaderPolicy {
    environment: Environment,
    connect_src: Vec<String>,
    nonce_bytes: usize,
    hsts_max_age_secs: u64,
}

impl SecurityHeaderPolicy {
    pub fn from_config(environment: Environment, config: &SecurityConfig) -> Self {
        let mut connect_src: Vec<String> = Vec::new();
        for origin in config.api_origins.iter().chain(config.websocket_origins.iter()) {
            match url::Url::parse(origin) {
                Ok(url) => {
                    let serialized = url.origin().ascii_serialization();
                    if !connect_src.contains(&serialized) {
                        connect_src.push(serialized);
                    }
                }
                Err(e) => tracing::warn!(origin = %origin, error = %e, "Skipping invalid connect-src origin"),
            }
        }

        Self {
            environment,
            connect_src,
            nonce_bytes: config.nonce_bytes,
            hsts_max_age_secs: config.hsts_max_age_secs,
        }
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Build the header set for one response, with a freshly drawn nonce.
    pub fn build_headers(&self, source: &dyn NonceSource) -> (HeaderSet, CspNonce) {
        let nonce = CspNonce::generate(source, self.nonce_bytes);
        let mut headers = HeaderSet::new();

        headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
        headers.insert(REFERRER_POLICY, HeaderValue::from_static("strict-origin-when-cross-origin"));

        if !self.environment.is_local() {
            let hsts = format!("max-age={}; includeSubDomains", self.hsts_max_age_secs);
            if let Ok(value) = HeaderValue::from_str(&hsts) {
                headers.insert(STRICT_TRANSPORT_SECURITY, value);
            }
        }

        let csp = HeaderValue::from_str(&self.content_security_policy(&nonce)).unwrap_or_else(|_| {
            tracing::error!("Generated CSP is not a valid header value; using fallback policy");
            HeaderValue::from_static(FALLBACK_CSP)
        });
        headers.insert(CONTENT_SECURITY_POLICY, csp);

        (headers, nonce)
    }

    fn content_security_policy(&self, nonce: &CspNonce) -> String {
        let mut script_src = format!("'self' 'nonce-{}' 'strict-dynamic'", nonce.as_str());
        if self.environment.is_local() {
            script_src.push_str(" 'unsafe-eval'");
        }

        let mut connect_src = String::from("'self'");
        for origin in &self.connect_src {
            connect_src.push(' ');
            connect_src.push_str(origin);
        }

        let mut directives = vec![
            "default-src 'self'".to_string(),
            format!("script-src {}", script_src),
            "style-src 'self' 'unsafe-inline'".to_string(),
            "img-src 'self' blob: data:".to_string(),
            "font-src 'self'".to_string(),
            format!("connect-src {}", connect_src),
            "object-src 'none'".to_string(),
            "base-uri 'self'".to_string(),
            "form-action 'self'".to_string(),
            "frame-ancestors 'none'".to_string(),
        ];
        if !self.environment.is_local() {
            directives.push("upgrade-insecure-requests".to_string());
        }
        directives.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::nonce::FixedNonceSource;

    fn policy(environment: Environment) -> SecurityHeaderPolicy {
        let config = SecurityConfig {
            api_origins: vec!["https://api.example.com/v1".into()],
            websocket_origins: vec!["wss://ws.example.com".into(), "https://api.example.com".into()],
            ..SecurityConfig::default()
        };
        SecurityHeaderPolicy::from_config(environment, &config)
    }

    #[test]
    fn test_always_present_headers() {
        for env in [Environment::Local, Environment::Staging, Environment::Production] {
            let (headers, _) = policy(env).build_headers(&FixedNonceSource(0));
            assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
            assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
            assert!(headers.contains("content-security-policy"));
        }
    }

    #[test]
    fn test_hsts_only_outside_local() {
        let (local, _) = policy(Environment::Local).build_headers(&FixedNonceSource(0));
        assert!(!local.contains("strict-transport-security"));

        let (prod, _) = policy(Environment::Production).build_headers(&FixedNonceSource(0));
        assert_eq!(
            prod.get("strict-transport-security").unwrap(),
            "max-age=63072000; includeSubDomains"
        );
    }

    #[test]
    fn test_csp_embeds_nonce_and_origins() {
        let (headers, nonce) = policy(Environment::Production).build_headers(&FixedNonceSource(9));
        let csp = headers.get("content-security-policy").unwrap().to_str().unwrap();

        assert!(csp.contains(&format!("'nonce-{}'", nonce.as_str())));
        assert!(csp.contains("connect-src 'self' https://api.example.com wss://ws.example.com;"));
        assert!(csp.ends_with("upgrade-insecure-requests"));
        assert!(!csp.contains("unsafe-eval"));
    }

    #[test]
    fn test_local_csp_is_relaxed() {
        let (headers, _) = policy(Environment::Local).build_headers(&FixedNonceSource(9));
        let csp = headers.get("content-security-policy").unwrap().to_str().unwrap();
        assert!(csp.contains("'unsafe-eval'"));
        assert!(!csp.contains("upgrade-insecure-requests"));
    }

    #[test]
    fn test_header_set_replaces_in_place() {
        let mut set = HeaderSet::new();
        set.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
        set.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        set.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

        let names: Vec<_> = set.iter().map(|(n, _)| n.as_str().to_string()).collect();
        assert_eq!(names, vec!["x-frame-options", "x-content-type-options"]);
        assert_eq!(set.get("x-frame-options").unwrap(), "DENY");

        let mut map = HeaderMap::new();
        map.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
        set.apply_to(&mut map);
        assert_eq!(map.get(X_FRAME_OPTIONS).unwrap(), "DENY");
    }
}
