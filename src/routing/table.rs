//! Route tier lookup.
//!
//! # Responsibilities
//! - Store compiled prefix → tier rules
//! - Classify a path (and optionally a method) into exactly one tier
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan (acceptable for typical route counts)
//! - Longest prefix wins; a method-restricted rule beats an any-method rule
//!   of the same prefix
//! - Total: unmatched paths fall back to the table's default tier, or to the
//!   mutating default for methods that are not safe (POST, PUT, PATCH, DELETE, ...)

use std::str::FromStr;

use axum::http::Method;
use thiserror::Error;

use crate::config::{RouteRuleConfig, RouteTableConfig};
use crate::routing::matcher::{normalize_path, Matcher, MethodMatcher, PathPrefixMatcher};
use crate::routing::tier::RouteTier;

/// Structural problems detected while compiling the route table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteTableError {
    #[error("route rule #{index}: prefix must not be empty")]
    EmptyPrefix { index: usize },

    #[error("route rule #{index}: prefix '{prefix}' must start with '/'")]
    RelativePrefix { index: usize, prefix: String },

    #[error("route rule #{index}: unknown HTTP method '{method}'")]
    UnknownMethod { index: usize, method: String },

    #[error("route rule #{index}: duplicate rule for prefix '{prefix}'")]
    Duplicate { index: usize, prefix: String },
}

/// A compiled rule.
#[derive(Debug)]
struct RouteRule {
    prefix: PathPrefixMatcher,
    methods: MethodMatcher,
    tier: RouteTier,
}

impl RouteRule {
    fn matches(&self, method: Option<&Method>, path: &str) -> bool {
        let method_ok = match method {
            Some(m) => self.methods.matches(m, path),
            None => self.methods.is_any(),
        };
        // Prefix matching ignores the method argument.
        method_ok && self.prefix.matches(&Method::GET, path)
    }

    /// Sort key: more specific first.
    fn rank(&self) -> (usize, bool) {
        (self.prefix.specificity(), !self.methods.is_any())
    }
}

/// Immutable path → tier table, built once at startup.
#[derive(Debug)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
    default_tier: RouteTier,
    mutating_default_tier: RouteTier,
}

impl RouteTable {
    /// Compile the table from configuration.
    pub fn from_config(config: &RouteTableConfig) -> Result<Self, RouteTableError> {
        let mut rules: Vec<RouteRule> = Vec::with_capacity(config.rules.len());

        for (index, rule) in config.rules.iter().enumerate() {
            let compiled = compile_rule(index, rule)?;
            let duplicate = rules.iter().any(|existing| {
                existing.prefix == compiled.prefix && same_methods(&existing.methods, &compiled.methods)
            });
            if duplicate {
                return Err(RouteTableError::Duplicate {
                    index,
                    prefix: rule.prefix.clone(),
                });
            }
            rules.push(compiled);
        }

        // Most specific first so the first hit is the longest prefix.
        rules.sort_by(|a, b| b.rank().cmp(&a.rank()));

        tracing::debug!(
            rules = rules.len(),
            default_tier = %config.default_tier,
            mutating_default_tier = %config.mutating_default_tier,
            "Route table compiled"
        );

        Ok(Self {
            rules,
            default_tier: config.default_tier,
            mutating_default_tier: config.mutating_default_tier,
        })
    }

    /// Classify a path, considering only rules that apply to every method.
    pub fn classify(&self, path: &str) -> RouteTier {
        self.lookup(None, path)
    }

    /// Classify a request by method and path. Unmatched requests with a
    /// non-safe method get the mutating default tier.
    pub fn classify_request(&self, method: &Method, path: &str) -> RouteTier {
        self.lookup(Some(method), path)
    }

    pub fn default_tier(&self) -> RouteTier {
        self.default_tier
    }

    pub fn mutating_default_tier(&self) -> RouteTier {
        self.mutating_default_tier
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn lookup(&self, method: Option<&Method>, path: &str) -> RouteTier {
        let normalized = normalize_path(path);
        self.rules
            .iter()
            .find(|rule| rule.matches(method, &normalized))
            .map(|rule| rule.tier)
            .unwrap_or_else(|| match method {
                Some(m) if !m.is_safe() => self.mutating_default_tier,
                _ => self.default_tier,
            })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        // The built-in table has fixed, valid prefixes.
        Self::from_config(&RouteTableConfig::default()).unwrap_or(Self {
            rules: Vec::new(),
            default_tier: RouteTier::Public,
            mutating_default_tier: RouteTier::AuthenticatedOnly,
        })
    }
}

fn compile_rule(index: usize, rule: &RouteRuleConfig) -> Result<RouteRule, RouteTableError> {
    if rule.prefix.is_empty() {
        return Err(RouteTableError::EmptyPrefix { index });
    }
    if !rule.prefix.starts_with('/') {
        return Err(RouteTableError::RelativePrefix {
            index,
            prefix: rule.prefix.clone(),
        });
    }

    let mut methods = Vec::with_capacity(rule.methods.len());
    for name in &rule.methods {
        let method = Method::from_str(&name.to_ascii_uppercase()).map_err(|_| RouteTableError::UnknownMethod {
            index,
            method: name.clone(),
        })?;
        if !methods.contains(&method) {
            methods.push(method);
        }
    }

    Ok(RouteRule {
        prefix: PathPrefixMatcher::new(normalize_path(&rule.prefix)),
        methods: MethodMatcher::new(methods),
        tier: rule.tier,
    })
}

fn same_methods(a: &MethodMatcher, b: &MethodMatcher) -> bool {
    a.methods().len() == b.methods().len() && a.methods().iter().all(|m| b.methods().contains(m))
}
