//! Failure injection tests: degraded providers, hostile input, live server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use edge_gateway::config::{Environment, RemoteConfig};
use edge_gateway::http::HttpServer;
use edge_gateway::lifecycle::{build_gateway, Shutdown};
use edge_gateway::session::provider::RemoteProvider;
use edge_gateway::session::{SessionVerifier, VerificationCache, VerificationError};

mod common;
use common::{StaticProvider, Stub};

#[tokio::test]
async fn test_unavailable_provider_degrades_to_signed_out() {
    let provider = Arc::new(StaticProvider::new().with("tok", Stub::Unavailable));
    let router = common::app(common::gateway_with(provider.clone(), Duration::from_secs(1)));

    let public = common::send(&router, common::get_with_cookie("/", "tok")).await;
    assert_eq!(public.status(), StatusCode::OK);
    assert!(public.headers().get(header::SET_COOKIE).is_some());
    assert_eq!(common::body_json(public).await["session"], "none");

    let protected = common::send(&router, common::get_with_cookie("/my/posts", "tok")).await;
    assert_eq!(protected.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn test_poisoned_cookies_never_error() {
    let provider = Arc::new(StaticProvider::new());
    let router = common::app(common::gateway_with(provider, Duration::from_secs(1)));

    let cases = [
        "auth_token=",
        "auth_token",
        "auth_token=\"\"",
        "auth_token=a.b.c; auth_token=d.e.f",
        ";;;=;auth_token===",
        "auth_token=%00%ff",
    ];
    for cookie in cases {
        let request = Request::builder()
            .uri("/my/favorites")
            .header(header::COOKIE, cookie)
            .body(axum::body::Body::empty())
            .unwrap();
        let res = common::send(&router, request).await;
        assert_eq!(res.status(), StatusCode::OK, "{cookie}");
        assert_eq!(common::body_json(res).await["session"], "none", "{cookie}");
    }
}

#[tokio::test]
async fn test_non_utf8_authorization_header_is_ignored() {
    let provider = Arc::new(StaticProvider::new());
    let router = common::app(common::gateway_with(provider.clone(), Duration::from_secs(1)));
    let request = Request::builder()
        .uri("/my/posts")
        .header(header::AUTHORIZATION, header::HeaderValue::from_bytes(b"Bearer \xfa\xfb").unwrap())
        .body(axum::body::Body::empty())
        .unwrap();

    let res = common::send(&router, request).await;
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn test_cache_absorbs_repeat_verifications() {
    let provider = Arc::new(StaticProvider::new().with("anon", Stub::Anonymous("a-1")));
    let verifier = SessionVerifier::new(provider.clone(), Duration::from_secs(1), "anonymous")
        .with_cache(VerificationCache::new(Duration::from_secs(60), 100));

    for _ in 0..5 {
        let session = verifier.verify(Some("anon")).await.unwrap();
        assert_eq!(session.subject_id(), Some("a-1"));
    }
    assert_eq!(provider.calls(), 1);

    // Failures are never cached.
    for _ in 0..3 {
        assert!(verifier.verify(Some("unknown")).await.is_err());
    }
    assert_eq!(provider.calls(), 4);
}

async fn spawn(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    addr
}

async fn remote_verify(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    match body["token"].as_str() {
        Some("anon") => (
            StatusCode::OK,
            Json(json!({ "subject_id": "anon-9", "sign_in_provider": "anonymous" })),
        ),
        Some("user") => (
            StatusCode::OK,
            Json(json!({ "subject_id": "user-9", "sign_in_provider": "github.com", "claims": { "name": "Dev" } })),
        ),
        Some("broken") => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({}))),
        Some("slow") => {
            tokio::time::sleep(Duration::from_secs(5)).await;
            (StatusCode::OK, Json(json!({ "subject_id": "late" })))
        }
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid" }))),
    }
}

#[tokio::test]
async fn test_remote_provider_outcomes() {
    let addr = spawn(Router::new().route("/verify", post(remote_verify))).await;
    let provider = RemoteProvider::from_config(
        &RemoteConfig {
            url: format!("http://{}/verify", addr),
        },
        Duration::from_millis(300),
    )
    .unwrap();
    let verifier = SessionVerifier::new(Arc::new(provider), Duration::from_millis(500), "anonymous");

    let anon = verifier.verify(Some("anon")).await.unwrap();
    assert!(anon.is_anonymous());

    let user = verifier.verify(Some("user")).await.unwrap();
    assert!(user.is_authenticated());
    assert_eq!(user.claim("name"), Some("Dev"));

    assert!(matches!(verifier.verify(Some("nope")).await, Err(VerificationError::Invalid(_))));
    assert!(matches!(verifier.verify(Some("broken")).await, Err(VerificationError::Unavailable(_))));
    assert!(matches!(verifier.verify(Some("slow")).await, Err(VerificationError::Timeout(_))));
}

#[tokio::test]
async fn test_remote_provider_unreachable() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = RemoteProvider::from_config(
        &RemoteConfig {
            url: format!("http://{}/verify", addr),
        },
        Duration::from_millis(300),
    )
    .unwrap();
    let verifier = SessionVerifier::new(Arc::new(provider), Duration::from_millis(500), "anonymous");

    assert!(matches!(verifier.verify(Some("anon")).await, Err(VerificationError::Unavailable(_))));
}

#[tokio::test]
async fn test_live_server_and_graceful_shutdown() {
    let gateway = build_gateway(&common::jwt_config(Environment::Local)).unwrap();
    let app = Router::new().route("/", get(|| async { "home" })).route("/my/posts", get(|| async { "posts" }));
    let server = HttpServer::new(common::jwt_config(Environment::Local), gateway, app);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap();

    let home = client.get(format!("http://{}/", addr)).send().await.expect("Gateway unreachable");
    assert_eq!(home.status(), 200);
    assert!(home.headers().get("content-security-policy").is_some());
    assert_eq!(home.text().await.unwrap(), "home");

    let posts = client
        .get(format!("http://{}/my/posts", addr))
        .header("cookie", format!("auth_token={}", common::anonymous_token("anon-1")))
        .send()
        .await
        .unwrap();
    assert_eq!(posts.status(), 200);
    assert_eq!(posts.headers().get("x-auth-upgrade").unwrap(), "required");

    let redirect = client.get(format!("http://{}/my/posts", addr)).send().await.unwrap();
    assert_eq!(redirect.status(), 307);
    drop(client);

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
    assert!(result.is_ok(), "server did not stop after shutdown");
}
