//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Wrap the application router with the gateway middleware
//! - Wire up cross-cutting layers (request id, tracing, timeout)
//! - Serve plain HTTP or TLS with graceful shutdown
//!
//! # Layer order (outermost first)
//! ```text
//! SetRequestId → PropagateRequestId → Trace → Timeout → gateway → app
//! ```

use std::net::SocketAddr;
use std::time::Duration;

use axum::{middleware, Router};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::gateway::{gateway_middleware, Gateway};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};

/// Time allowed for in-flight requests once shutdown starts (TLS only;
/// `axum::serve` drains without a deadline).
const TLS_DRAIN_SECS: u64 = 10;

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a server that runs `app` behind the gateway.
    pub fn new(config: GatewayConfig, gateway: Gateway, app: Router) -> Self {
        let router = build_router(&config, gateway, app);
        Self { router, config }
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            environment = self.config.environment.as_str(),
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS on `addr`.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %addr,
            environment = self.config.environment.as_str(),
            "HTTPS server starting"
        );

        let handle = axum_server::Handle::new();
        let signal_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTPS server draining");
            signal_handle.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service_with_connect_info::<SocketAddr>())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

/// Wrap `app` with the gateway and the cross-cutting layers.
#[allow(deprecated)]
pub fn build_router(config: &GatewayConfig, gateway: Gateway, app: Router) -> Router {
    app.layer(middleware::from_fn_with_state(gateway, gateway_middleware))
        .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(set_request_id_layer())
}
