//! Verification result cache.
//!
//! Keyed by the raw credential. An entry never outlives the credential's own
//! expiry, so a cached hit can never extend an expired credential.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

use crate::observability::metrics;
use crate::session::model::Session;

#[derive(Debug, Clone)]
struct CacheEntry {
    session: Session,
    /// Seconds since the Unix epoch.
    expires_at: u64,
}

/// A thread-safe, bounded, TTL cache of verified sessions.
#[derive(Clone)]
pub struct VerificationCache {
    inner: Arc<DashMap<String, CacheEntry>>,
    ttl: Duration,
    max_entries: usize,
}

impl VerificationCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl,
            max_entries,
        }
    }

    /// Look up a credential, evicting it if expired.
    pub fn get(&self, credential: &str) -> Option<Session> {
        self.get_at(credential, unix_now())
    }

    /// Cache a session. Credentials without a known expiry are not cached.
    pub fn insert(&self, credential: &str, session: Session, credential_expires_at: Option<u64>) {
        self.insert_at(credential, session, credential_expires_at, unix_now());
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        self.purge_expired_at(unix_now());
    }

    fn get_at(&self, credential: &str, now: u64) -> Option<Session> {
        let hit = self
            .inner
            .get(credential)
            .map(|entry| (entry.expires_at > now).then(|| entry.session.clone()));

        match hit {
            Some(Some(session)) => {
                metrics::record_cache_lookup("hit");
                Some(session)
            }
            Some(None) => {
                self.inner.remove_if(credential, |_, entry| entry.expires_at <= now);
                metrics::record_cache_lookup("expired");
                None
            }
            None => {
                metrics::record_cache_lookup("miss");
                None
            }
        }
    }

    fn insert_at(&self, credential: &str, session: Session, credential_expires_at: Option<u64>, now: u64) {
        let Some(credential_expiry) = credential_expires_at else {
            return;
        };
        let expires_at = credential_expiry.min(now.saturating_add(self.ttl.as_secs()));
        if expires_at <= now {
            return;
        }

        if self.inner.len() >= self.max_entries && !self.inner.contains_key(credential) {
            self.purge_expired_at(now);
            if self.inner.len() >= self.max_entries {
                tracing::debug!(max_entries = self.max_entries, "Verification cache full; skipping insert");
                return;
            }
        }

        self.inner.insert(credential.to_string(), CacheEntry { session, expires_at });
    }

    fn purge_expired_at(&self, now: u64) {
        self.inner.retain(|_, entry| entry.expires_at > now);
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
