//! Local JWT verification.
//!
//! Security notes:
//! - `exp` and `sub` are always required; `exp` is always validated
//! - HS256 uses a shared secret, RS256 a PEM public key read at startup
//! - `aud` is only checked when configured

use std::collections::BTreeMap;
use std::fs;

use async_trait::async_trait;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use crate::config::{JwtAlgorithm, JwtConfig};
use crate::session::error::{ProviderError, VerificationError};
use crate::session::provider::{IdentityProvider, VerifiedIdentity, SIGN_IN_PROVIDER_CLAIM};

/// Registered claims that are not copied into the session's claim map.
const REGISTERED_CLAIMS: &[&str] = &["iss", "aud", "sub", "iat", "exp", "nbf", "jti", "auth_time"];

/// Verifies signed tokens without a network round trip.
pub struct JwtProvider {
    key: DecodingKey,
    validation: Validation,
    provider_claim: String,
}

impl JwtProvider {
    pub fn from_config(config: &JwtConfig, provider_claim: &str) -> Result<Self, ProviderError> {
        let (algorithm, key) = match config.algorithm {
            JwtAlgorithm::HS256 => (Algorithm::HS256, DecodingKey::from_secret(config.secret.as_bytes())),
            JwtAlgorithm::RS256 => {
                let path = config.public_key_path.clone().unwrap_or_default();
                let pem = fs::read(&path).map_err(|source| ProviderError::KeyFile { path, source })?;
                (Algorithm::RS256, DecodingKey::from_rsa_pem(&pem)?)
            }
        };

        let mut validation = Validation::new(algorithm);
        validation.leeway = config.leeway_secs;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if let Some(iss) = &config.issuer {
            validation.set_issuer(&[iss]);
        }
        match &config.audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            key,
            validation,
            provider_claim: provider_claim.to_string(),
        })
    }

    /// HS256 provider with default validation; handy for tests and local setups.
    pub fn hs256(secret: &str, provider_claim: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_aud = false;
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            provider_claim: provider_claim.to_string(),
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtProvider {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, VerificationError> {
        let data = decode::<Map<String, Value>>(credential, &self.key, &self.validation)
            .map_err(|e| VerificationError::Invalid(describe(e.kind()).to_string()))?;
        let token = data.claims;

        let subject_id = match token.get("sub") {
            Some(Value::String(sub)) if !sub.is_empty() => sub.clone(),
            _ => return Err(VerificationError::Invalid("missing subject".into())),
        };

        let provider = claim_at_path(&token, &self.provider_claim).and_then(scalar_to_string);

        let mut claims: BTreeMap<String, String> = token
            .iter()
            .filter(|(name, _)| !REGISTERED_CLAIMS.contains(&name.as_str()))
            .filter_map(|(name, value)| scalar_to_string(value).map(|v| (name.clone(), v)))
            .collect();
        if let Some(p) = &provider {
            claims.insert(SIGN_IN_PROVIDER_CLAIM.to_string(), p.clone());
        }

        Ok(VerifiedIdentity {
            subject_id,
            claims,
            provider,
            expires_at: token.get("exp").and_then(Value::as_u64),
        })
    }

    fn name(&self) -> &'static str {
        "jwt"
    }
}

fn describe(kind: &ErrorKind) -> &'static str {
    match kind {
        ErrorKind::ExpiredSignature => "expired",
        ErrorKind::ImmatureSignature => "not yet valid",
        ErrorKind::InvalidSignature => "bad signature",
        ErrorKind::InvalidIssuer => "wrong issuer",
        ErrorKind::InvalidAudience => "wrong audience",
        ErrorKind::InvalidAlgorithm => "unexpected algorithm",
        ErrorKind::MissingRequiredClaim(_) => "missing required claim",
        _ => "malformed",
    }
}

/// Resolve a dotted claim path such as `firebase.sign_in_provider`.
fn claim_at_path<'a>(claims: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = claims.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
