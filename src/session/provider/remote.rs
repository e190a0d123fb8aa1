//! Verification delegated to an HTTP endpoint.
//!
//! # Protocol
//! ```text
//! POST {url}  {"token": "<credential>"}
//!   200 → {"subject_id": "...", "claims": {...}, "sign_in_provider": "...", "expires_at": 1700000000}
//!   401 / 403 → credential rejected
//!   anything else → provider unavailable
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::RemoteConfig;
use crate::session::error::{ProviderError, VerificationError};
use crate::session::provider::{IdentityProvider, VerifiedIdentity, SIGN_IN_PROVIDER_CLAIM};

#[derive(Debug, Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

/// Successful verification reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteVerdict {
    pub subject_id: String,
    #[serde(default)]
    pub claims: BTreeMap<String, String>,
    #[serde(default)]
    pub sign_in_provider: Option<String>,
    #[serde(default)]
    pub expires_at: Option<u64>,
}

/// Calls an external verification endpoint.
pub struct RemoteProvider {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl RemoteProvider {
    pub fn from_config(config: &RemoteConfig, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
            timeout,
        })
    }
}

#[async_trait]
impl IdentityProvider for RemoteProvider {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, VerificationError> {
        let response = self
            .client
            .post(&self.url)
            .json(&VerifyRequest { token: credential })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    VerificationError::Timeout(self.timeout)
                } else {
                    VerificationError::Unavailable(e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(VerificationError::Invalid("rejected by provider".into()));
            }
            status => {
                return Err(VerificationError::Unavailable(format!("unexpected status {}", status)));
            }
        }

        let verdict: RemoteVerdict = response
            .json()
            .await
            .map_err(|e| VerificationError::Unavailable(format!("malformed reply: {}", e)))?;

        if verdict.subject_id.is_empty() {
            return Err(VerificationError::Unavailable("reply without subject".into()));
        }

        let mut claims = verdict.claims;
        if let Some(p) = &verdict.sign_in_provider {
            claims.insert(SIGN_IN_PROVIDER_CLAIM.to_string(), p.clone());
        }

        Ok(VerifiedIdentity {
            subject_id: verdict.subject_id,
            claims,
            provider: verdict.sign_in_provider,
            expires_at: verdict.expires_at,
        })
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
