//! Route matching logic.
//!
//! # Responsibilities
//! - Normalize request paths before matching
//! - Match path prefixes on segment boundaries (case-sensitive)
//! - Match HTTP methods
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `/my/posts` matches `/my/posts/42` but never `/my/postscript`
//! - Empty condition = always matches (wildcard)
//! - No regex to guarantee O(n) matching

use std::borrow::Cow;

use axum::http::Method;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the (method, normalized path) pair matches this condition.
    fn matches(&self, method: &Method, path: &str) -> bool;
}

/// Matches a path prefix on segment boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    /// A trailing slash is dropped so `/my/` and `/my` behave the same.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim_end_matches('/');
        Self {
            prefix: if trimmed.is_empty() { "/".to_string() } else { trimmed.to_string() },
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Prefix length in bytes; longer prefixes are more specific.
    pub fn specificity(&self) -> usize {
        self.prefix.len()
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        if self.prefix == "/" {
            return path.starts_with('/');
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

/// Matches a set of HTTP methods. An empty set matches every method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodMatcher {
    methods: Vec<Method>,
}

impl MethodMatcher {
    pub fn new(methods: Vec<Method>) -> Self {
        Self { methods }
    }

    pub fn any() -> Self {
        Self::default()
    }

    pub fn is_any(&self) -> bool {
        self.methods.is_empty()
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, method: &Method, _path: &str) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }
}

/// Normalize a request path for classification.
///
/// Percent-decodes, collapses repeated slashes, and resolves `.`/`..`
/// segments so that `/my//posts` or `/a/../my/posts` cannot slip past a
/// protected prefix. Escapes that do not decode to UTF-8 become U+FFFD;
/// the rest of the path is still decoded. Query strings are not part of the input.
pub fn normalize_path(raw: &str) -> String {
    let bytes = urlencoding::decode_binary(raw.as_bytes());
    let decoded: Cow<'_, str> = String::from_utf8_lossy(&bytes);

    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    let mut normalized = String::with_capacity(decoded.len() + 1);
    for segment in &segments {
        normalized.push('/');
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push('/');
    }
    normalized
}
