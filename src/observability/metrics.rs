//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_decisions_total` (counter): decisions by action and route tier
//! - `gateway_verifications_total` (counter): verifier calls by outcome
//! - `gateway_verification_duration_seconds` (histogram): provider latency
//! - `gateway_cache_lookups_total` (counter): verification cache hits/misses
//! - `gateway_request_duration_seconds` (histogram): time spent in the gateway layer
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade; without an installed
//!   recorder every call is a no-op, so tests need no setup
//! - Label values are fixed strings, never subject ids or paths

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from inside the Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_decision(action: &'static str, tier: &'static str) {
    ::metrics::counter!("gateway_decisions_total", "action" => action, "tier" => tier).increment(1);
}

pub fn record_verification(outcome: &'static str) {
    ::metrics::counter!("gateway_verifications_total", "outcome" => outcome).increment(1);
}

pub fn record_verification_duration(start: Instant) {
    ::metrics::histogram!("gateway_verification_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(result: &'static str) {
    ::metrics::counter!("gateway_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_gateway_latency(start: Instant) {
    ::metrics::histogram!("gateway_request_duration_seconds").record(start.elapsed().as_secs_f64());
}
