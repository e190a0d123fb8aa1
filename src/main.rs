//! Edge gateway binary.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ request id ─▶ trace ─▶ timeout ─▶ gateway ─┬─▶ upstream app
//!                                                                │
//!     Client Response                                            │ Redirect
//!     ◀──────────────── security headers + decision headers ◀────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use clap::Parser;
use tokio::net::TcpListener;

use edge_gateway::config::load_config;
use edge_gateway::http::{forward_handler, HttpServer, Upstream};
use edge_gateway::lifecycle::{build_gateway, wait_for_signal, Shutdown, StartupError};
use edge_gateway::net::load_tls_config;
use edge_gateway::observability::{init_logging, init_metrics};

#[derive(Parser, Debug)]
#[command(name = "edge-gateway", version, about = "Edge request-interception gateway")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("edge-gateway: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.observability, config.environment);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = config.environment.as_str(),
        config = %args.config.display(),
        "edge-gateway starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let gateway = match build_gateway(&config) {
        Ok(gateway) => gateway,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            std::process::exit(1);
        }
    };

    let upstream = Upstream::new(&config.upstream.address, Duration::from_secs(config.timeouts.connect_secs))
        .map_err(|e| StartupError::Upstream {
            address: config.upstream.address.clone(),
            reason: e.to_string(),
        })?;
    tracing::info!(upstream = %upstream.authority(), "Forwarding allowed requests");
    let app = Router::new().fallback(forward_handler).with_state(upstream);

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let tls = config.listener.tls.clone();
    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config, gateway, app);

    let mut serve = tokio::spawn(async move {
        match tls {
            Some(tls) => {
                let addr: SocketAddr = bind_address
                    .parse()
                    .map_err(|e| StartupError::Io(std::io::Error::new(std::io::ErrorKind::InvalidInput, e)))?;
                let rustls = load_tls_config(&tls).await?;
                server.run_tls(addr, rustls, server_shutdown).await?;
            }
            None => {
                let listener = TcpListener::bind(&bind_address).await?;
                server.run(listener, server_shutdown).await?;
            }
        }
        Ok::<(), StartupError>(())
    });

    let stopped_by_signal = tokio::select! {
        _ = wait_for_signal() => true,
        result = &mut serve => {
            result??;
            false
        }
    };

    if stopped_by_signal {
        shutdown.trigger();
        serve.await??;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
