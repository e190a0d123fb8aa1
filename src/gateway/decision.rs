//! The gateway decision table.
//!
//! ```text
//! Session.kind   | Public | AnonymousAllowed       | AuthenticatedOnly
//! ---------------+--------+------------------------+------------------
//! None           | Allow  | Allow (+bootstrap hint)| Redirect(login)
//! Anonymous      | Allow  | Allow                  | AttachUpgradeFlag
//! Authenticated  | Allow  | Allow                  | Allow
//! ```
//!
//! `decide` is a pure function of its inputs: no I/O, no counters, no
//! clock. The same (session, tier) always produces the same decision.

use axum::http::{HeaderName, HeaderValue};

use crate::config::DecisionConfig;
use crate::routing::RouteTier;
use crate::security::HeaderSet;
use crate::session::{Session, SessionKind};

/// Value of the upgrade-flag header.
pub const UPGRADE_REQUIRED: &str = "required";
/// Value of the bootstrap-hint header.
pub const BOOTSTRAP_ANONYMOUS: &str = "anonymous";

/// What the gateway does with a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Let the request through.
    Allow,
    /// Let the request through and tell the client to offer an in-place sign-in upgrade.
    AttachUpgradeFlag,
    /// Send the client elsewhere without touching the application.
    Redirect(String),
}

impl Action {
    /// Metrics / log label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Allow => "allow",
            Action::AttachUpgradeFlag => "upgrade",
            Action::Redirect(_) => "redirect",
        }
    }

    /// Whether the application handler runs.
    pub fn proceeds(&self) -> bool {
        !matches!(self, Action::Redirect(_))
    }
}

/// One request's decision plus the signalling headers that go with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayDecision {
    pub action: Action,
    pub headers: HeaderSet,
}

/// Marker inserted into request extensions when the client should show the
/// upgrade modal, so server-rendered pages can embed the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpgradeSignal;

/// Maps (session kind, route tier) to a decision.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    login_redirect: String,
    upgrade_header: HeaderName,
    bootstrap_header: HeaderName,
}

impl DecisionEngine {
    pub fn new(login_redirect: impl Into<String>, upgrade_header: HeaderName, bootstrap_header: HeaderName) -> Self {
        Self {
            login_redirect: login_redirect.into(),
            upgrade_header,
            bootstrap_header,
        }
    }

    /// Build from configuration. Header names are validated at load time;
    /// anything that slipped through falls back to the defaults.
    pub fn from_config(config: &DecisionConfig) -> Self {
        let defaults = DecisionConfig::default();
        let header = |value: &str, fallback: &str| {
            HeaderName::from_bytes(value.as_bytes())
                .or_else(|_| HeaderName::from_bytes(fallback.as_bytes()))
                .unwrap_or(HeaderName::from_static("x-auth-upgrade"))
        };
        Self::new(
            config.login_redirect.clone(),
            header(&config.upgrade_header, &defaults.upgrade_header),
            header(&config.bootstrap_header, &defaults.bootstrap_header),
        )
    }

    pub fn upgrade_header(&self) -> &HeaderName {
        &self.upgrade_header
    }

    pub fn login_redirect(&self) -> &str {
        &self.login_redirect
    }

    /// Decide what happens to a request.
    pub fn decide(&self, session: &Session, tier: RouteTier) -> GatewayDecision {
        let mut headers = HeaderSet::new();

        let action = match (session.kind(), tier) {
            (_, RouteTier::Public) => Action::Allow,
            (SessionKind::None, RouteTier::AnonymousAllowed) => {
                headers.insert(self.bootstrap_header.clone(), HeaderValue::from_static(BOOTSTRAP_ANONYMOUS));
                Action::Allow
            }
            (_, RouteTier::AnonymousAllowed) => Action::Allow,
            (SessionKind::None, RouteTier::AuthenticatedOnly) => Action::Redirect(self.login_redirect.clone()),
            (SessionKind::Anonymous, RouteTier::AuthenticatedOnly) => {
                headers.insert(self.upgrade_header.clone(), HeaderValue::from_static(UPGRADE_REQUIRED));
                Action::AttachUpgradeFlag
            }
            (SessionKind::Authenticated, RouteTier::AuthenticatedOnly) => Action::Allow,
        };

        GatewayDecision { action, headers }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::from_config(&DecisionConfig::default())
    }
}
