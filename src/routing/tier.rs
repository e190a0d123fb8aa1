//! Route protection tiers.

use serde::{Deserialize, Serialize};

/// Protection level required by a URL path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RouteTier {
    /// Anyone may access, with or without a session.
    #[default]
    Public,
    /// Any session is fine; callers without one are nudged to sign in anonymously.
    AnonymousAllowed,
    /// Requires a non-anonymous session.
    AuthenticatedOnly,
}

impl RouteTier {
    pub const ALL: [RouteTier; 3] = [
        RouteTier::Public,
        RouteTier::AnonymousAllowed,
        RouteTier::AuthenticatedOnly,
    ];

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteTier::Public => "public",
            RouteTier::AnonymousAllowed => "anonymous_allowed",
            RouteTier::AuthenticatedOnly => "authenticated_only",
        }
    }
}

impl std::fmt::Display for RouteTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
