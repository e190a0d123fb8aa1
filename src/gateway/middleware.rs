//! Gateway middleware.
//!
//! Runs in front of every application handler:
//! resolve session → classify route → decide → run handler (unless
//! redirected) → attach decision headers, security headers, and the
//! clear-credential directive.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header::SET_COOKIE, HeaderValue, Method, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::gateway::decision::{Action, UpgradeSignal, UPGRADE_REQUIRED};
use crate::gateway::state::Gateway;
use crate::http::request::X_REQUEST_ID;
use crate::observability::metrics;

/// Request header through which the application receives the CSP nonce.
pub const X_NONCE: &str = "x-nonce";

pub async fn gateway_middleware(State(gateway): State<Gateway>, mut request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let resolution = gateway.resolve(request.headers()).await;
    let (tier, decision) = gateway.evaluate(request.method(), request.uri().path(), &resolution.session);
    let (security_headers, nonce) = gateway.policy().build_headers(gateway.nonce_source());

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
        tier = %tier,
        session = %resolution.session.kind(),
        subject = resolution.session.subject_id().unwrap_or("-"),
        action = decision.action.as_str(),
        clear_credential = resolution.clear_credential,
        "Gateway decision"
    );
    metrics::record_decision(decision.action.as_str(), tier.as_str());

    let mut response = match &decision.action {
        Action::Redirect(target) => login_redirect(request.method(), target),
        action => {
            let upgrade_header = gateway.engine().upgrade_header().clone();

            // Inbound copies of gateway-owned headers are never trusted.
            let headers = request.headers_mut();
            headers.remove(&upgrade_header);
            headers.remove(X_NONCE);
            if let Ok(value) = HeaderValue::from_str(nonce.as_str()) {
                headers.insert(X_NONCE, value);
            }
            if *action == Action::AttachUpgradeFlag {
                headers.insert(upgrade_header, HeaderValue::from_static(UPGRADE_REQUIRED));
                request.extensions_mut().insert(UpgradeSignal);
            }

            request.extensions_mut().insert(resolution.session.clone());
            request.extensions_mut().insert(nonce);
            next.run(request).await
        }
    };

    let headers = response.headers_mut();
    decision.headers.apply_to(headers);
    security_headers.apply_to(headers);
    if resolution.clear_credential {
        headers.append(SET_COOKIE, gateway.extractor().clear_cookie());
    }

    metrics::record_gateway_latency(start);
    response
}

/// 307 for GET/HEAD. Other methods get 303: the login page is fetched with
/// GET and the request body is not resent.
fn login_redirect(method: &Method, target: &str) -> Response {
    if *method == Method::GET || *method == Method::HEAD {
        Redirect::temporary(target).into_response()
    } else {
        Redirect::to(target).into_response()
    }
}
