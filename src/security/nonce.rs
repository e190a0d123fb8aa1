//! CSP nonce generation.
//!
//! The random source is injected so tests can substitute a deterministic one.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

/// Source of nonce bytes.
pub trait NonceSource: Send + Sync {
    fn fill(&self, buf: &mut [u8]);
}

/// Operating-system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsNonceSource;

impl NonceSource for OsNonceSource {
    fn fill(&self, buf: &mut [u8]) {
        OsRng.fill_bytes(buf);
    }
}

/// Repeats a fixed byte. Only meaningful in tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedNonceSource(pub u8);

impl NonceSource for FixedNonceSource {
    fn fill(&self, buf: &mut [u8]) {
        buf.fill(self.0);
    }
}

/// A single-use nonce for one response.
///
/// `Debug` and `Display` are redacted so the value cannot end up in logs by
/// accident; use [`CspNonce::as_str`] where the value must be rendered.
#[derive(Clone, PartialEq, Eq)]
pub struct CspNonce(String);

impl CspNonce {
    /// Draw `len` bytes from `source` and base64-encode them.
    pub fn generate(source: &dyn NonceSource, len: usize) -> Self {
        let mut bytes = vec![0u8; len];
        source.fill(&mut bytes);
        Self(STANDARD.encode(&bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for CspNonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CspNonce(<redacted>)")
    }
}

impl std::fmt::Display for CspNonce {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}
