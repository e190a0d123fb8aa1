//! Per-request session classification.

use std::collections::BTreeMap;

/// Who is calling, as far as the gateway is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// No credential, or one that failed verification.
    None,
    /// Valid credential issued by the anonymous sign-in provider.
    Anonymous,
    /// Valid credential issued by a real identity provider.
    Authenticated,
}

impl SessionKind {
    pub const ALL: [SessionKind; 3] = [
        SessionKind::None,
        SessionKind::Anonymous,
        SessionKind::Authenticated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::None => "none",
            SessionKind::Anonymous => "anonymous",
            SessionKind::Authenticated => "authenticated",
        }
    }
}

impl std::fmt::Display for SessionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A verified (or absent) caller identity, scoped to one request.
///
/// Fields are private: a `None` session can only be built through
/// [`Session::none`], so it never carries a subject or claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    kind: SessionKind,
    subject_id: Option<String>,
    claims: BTreeMap<String, String>,
}

impl Session {
    pub fn none() -> Self {
        Self {
            kind: SessionKind::None,
            subject_id: None,
            claims: BTreeMap::new(),
        }
    }

    pub fn anonymous(subject_id: impl Into<String>, claims: BTreeMap<String, String>) -> Self {
        Self {
            kind: SessionKind::Anonymous,
            subject_id: Some(subject_id.into()),
            claims,
        }
    }

    pub fn authenticated(subject_id: impl Into<String>, claims: BTreeMap<String, String>) -> Self {
        Self {
            kind: SessionKind::Authenticated,
            subject_id: Some(subject_id.into()),
            claims,
        }
    }

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Stable across the anonymous → authenticated upgrade when the provider
    /// links accounts.
    pub fn subject_id(&self) -> Option<&str> {
        self.subject_id.as_deref()
    }

    pub fn claims(&self) -> &BTreeMap<String, String> {
        &self.claims
    }

    pub fn claim(&self, name: &str) -> Option<&str> {
        self.claims.get(name).map(String::as_str)
    }

    pub fn is_anonymous(&self) -> bool {
        self.kind == SessionKind::Anonymous
    }

    pub fn is_authenticated(&self) -> bool {
        self.kind == SessionKind::Authenticated
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::none()
    }
}
