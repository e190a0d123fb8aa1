//! Extracting and clearing the session credential.

use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::{HeaderMap, HeaderValue};

use crate::config::SessionConfig;

/// Where a credential was found. Only cookies can be cleared by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Cookie,
    Bearer,
}

/// A raw credential pulled from a request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub value: String,
    pub source: CredentialSource,
}

// Never print the token itself.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("source", &self.source)
            .field("len", &self.value.len())
            .finish()
    }
}

/// Pulls credentials out of request headers.
#[derive(Debug, Clone)]
pub struct CredentialExtractor {
    cookie_name: String,
    accept_bearer: bool,
    secure_cookie: bool,
}

impl CredentialExtractor {
    pub fn new(cookie_name: impl Into<String>, accept_bearer: bool, secure_cookie: bool) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            accept_bearer,
            secure_cookie,
        }
    }

    pub fn from_config(config: &SessionConfig, secure_cookie: bool) -> Self {
        Self::new(config.cookie_name.clone(), config.accept_bearer, secure_cookie)
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Cookie first, then (optionally) `Authorization: Bearer`.
    pub fn extract(&self, headers: &HeaderMap) -> Option<Credential> {
        if let Some(value) = self.cookie_value(headers) {
            return Some(Credential {
                value,
                source: CredentialSource::Cookie,
            });
        }

        if !self.accept_bearer {
            return None;
        }
        headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|token| Credential {
                value: token.trim().to_string(),
                source: CredentialSource::Bearer,
            })
    }

    /// `Set-Cookie` value that expires the credential cookie.
    pub fn clear_cookie(&self) -> HeaderValue {
        let mut cookie = format!("{}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax", self.cookie_name);
        if self.secure_cookie {
            cookie.push_str("; Secure");
        }
        // Cookie names are validated at config load, so this cannot fail.
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("invalid=; Max-Age=0"))
    }

    fn cookie_value(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .flat_map(|h| h.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == self.cookie_name)
            .map(|(_, value)| value.trim().trim_matches('"').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_cookie_extraction() {
        let extractor = CredentialExtractor::new("auth_token", true, false);
        let h = headers(&[("cookie", "theme=dark; auth_token=abc.def.ghi; other=1")]);

        let credential = extractor.extract(&h).unwrap();
        assert_eq!(credential.value, "abc.def.ghi");
        assert_eq!(credential.source, CredentialSource::Cookie);
    }

    #[test]
    fn test_multiple_cookie_headers() {
        let extractor = CredentialExtractor::new("auth_token", false, false);
        let h = headers(&[("cookie", "a=1"), ("cookie", "auth_token=\"quoted\"")]);
        assert_eq!(extractor.extract(&h).unwrap().value, "quoted");
    }

    #[test]
    fn test_prefix_named_cookie_is_not_a_match() {
        let extractor = CredentialExtractor::new("auth_token", false, false);
        let h = headers(&[("cookie", "auth_token_legacy=zzz")]);
        assert!(extractor.extract(&h).is_none());
    }

    #[test]
    fn test_bearer_fallback() {
        let h = headers(&[("authorization", "Bearer tok")]);

        let extractor = CredentialExtractor::new("auth_token", true, false);
        let credential = extractor.extract(&h).unwrap();
        assert_eq!(credential.source, CredentialSource::Bearer);
        assert_eq!(credential.value, "tok");

        let cookie_only = CredentialExtractor::new("auth_token", false, false);
        assert!(cookie_only.extract(&h).is_none());
    }

    #[test]
    fn test_cookie_wins_over_bearer() {
        let extractor = CredentialExtractor::new("auth_token", true, false);
        let h = headers(&[("authorization", "Bearer header"), ("cookie", "auth_token=cookie")]);
        assert_eq!(extractor.extract(&h).unwrap().source, CredentialSource::Cookie);
    }

    #[test]
    fn test_clear_cookie() {
        let local = CredentialExtractor::new("auth_token", true, false);
        assert_eq!(local.clear_cookie(), "auth_token=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax");

        let secure = CredentialExtractor::new("auth_token", true, true);
        assert!(secure.clear_cookie().to_str().unwrap().ends_with("; Secure"));
    }

    #[test]
    fn test_debug_hides_value() {
        let credential = Credential {
            value: "secret-token".into(),
            source: CredentialSource::Cookie,
        };
        assert!(!format!("{:?}", credential).contains("secret-token"));
    }
}
