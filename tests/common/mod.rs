//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    response::{IntoResponse, Response},
    Json, Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use edge_gateway::config::{Environment, GatewayConfig, IdentityConfig, JwtConfig};
use edge_gateway::gateway::{DecisionEngine, Gateway, UpgradeSignal};
use edge_gateway::http::build_router;
use edge_gateway::lifecycle::build_gateway;
use edge_gateway::routing::RouteTable;
use edge_gateway::security::{CspNonce, SecurityHeaderPolicy};
use edge_gateway::session::{
    CredentialExtractor, IdentityProvider, Session, SessionVerifier, VerificationError, VerifiedIdentity,
};

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";

fn now() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs()
}

/// Mint an HS256 token the way the identity provider would.
pub fn mint(sub: &str, sign_in_provider: &str, expires_in_secs: i64) -> String {
    let exp = (now() as i64 + expires_in_secs) as u64;
    let claims = json!({
        "sub": sub,
        "exp": exp,
        "iat": now(),
        "name": "Test User",
        "firebase": { "sign_in_provider": sign_in_provider },
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

pub fn anonymous_token(sub: &str) -> String {
    mint(sub, "anonymous", 3600)
}

pub fn user_token(sub: &str) -> String {
    mint(sub, "google.com", 3600)
}

pub fn expired_token(sub: &str) -> String {
    mint(sub, "google.com", -3600)
}

/// Config with the default route table and a JWT provider using [`SECRET`].
pub fn jwt_config(environment: Environment) -> GatewayConfig {
    GatewayConfig {
        environment,
        identity: IdentityConfig::Jwt(JwtConfig {
            secret: SECRET.into(),
            leeway_secs: 0,
            ..JwtConfig::default()
        }),
        ..GatewayConfig::default()
    }
}

pub fn jwt_gateway(environment: Environment) -> Gateway {
    build_gateway(&jwt_config(environment)).unwrap()
}

/// Outcome a [`StaticProvider`] returns for a token.
#[derive(Clone)]
pub enum Stub {
    Anonymous(&'static str),
    Authenticated(&'static str),
    Invalid,
    Unavailable,
    Hang,
}

/// Provider with canned answers; counts calls.
#[derive(Default)]
pub struct StaticProvider {
    answers: HashMap<String, Stub>,
    pub calls: AtomicUsize,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, token: &str, stub: Stub) -> Self {
        self.answers.insert(token.to_string(), stub);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for StaticProvider {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, VerificationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (subject, provider) = match self.answers.get(credential) {
            Some(Stub::Anonymous(sub)) => (*sub, "anonymous"),
            Some(Stub::Authenticated(sub)) => (*sub, "password"),
            Some(Stub::Unavailable) => return Err(VerificationError::Unavailable("stub down".into())),
            Some(Stub::Hang) => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                return Err(VerificationError::Unavailable("stub hung".into()));
            }
            Some(Stub::Invalid) | None => return Err(VerificationError::Invalid("unknown token".into())),
        };
        Ok(VerifiedIdentity {
            subject_id: subject.to_string(),
            claims: Default::default(),
            provider: Some(provider.to_string()),
            expires_at: Some(now() + 3600),
        })
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Gateway over an arbitrary provider with default routes and local settings.
pub fn gateway_with(provider: Arc<dyn IdentityProvider>, timeout: Duration) -> Gateway {
    let config = GatewayConfig::default();
    Gateway::new(
        Arc::new(RouteTable::from_config(&config.routes).unwrap()),
        SessionVerifier::new(provider, timeout, "anonymous"),
        CredentialExtractor::from_config(&config.session, false),
        DecisionEngine::from_config(&config.gateway),
        SecurityHeaderPolicy::from_config(Environment::Local, &config.security),
    )
}

/// Stand-in application: reports what the gateway handed it.
async fn page(request: Request<Body>) -> Response {
    let extensions = request.extensions();
    let session = extensions.get::<Session>().cloned();
    let nonce = extensions.get::<CspNonce>().map(|n| n.as_str().to_string());
    let upgrade = extensions.get::<UpgradeSignal>().is_some();
    let nonce_header = request
        .headers()
        .get("x-nonce")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response = Json(json!({
        "path": request.uri().path(),
        "session": session.as_ref().map(|s| s.kind().as_str()),
        "subject": session.as_ref().and_then(|s| s.subject_id().map(str::to_string)),
        "upgrade": upgrade,
        "nonce": nonce,
        "nonce_header": nonce_header,
    }))
    .into_response();
    // Overwritten by the gateway's policy.
    response
        .headers_mut()
        .insert(header::X_FRAME_OPTIONS, header::HeaderValue::from_static("SAMEORIGIN"));
    response
}

pub fn app(gateway: Gateway) -> Router {
    let config = GatewayConfig::default();
    build_router(&config, gateway, Router::new().fallback(page))
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder().uri(path).body(Body::empty()).unwrap()
}

pub fn get_with_cookie(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::COOKIE, format!("theme=dark; auth_token={}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_bearer(path: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn request(method: Method, path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("auth_token={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
