//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! gateway middleware, verifier, cache
//!     → logging.rs (structured events, request id on every gateway log line)
//!     → metrics.rs (decision / verification / cache counters)
//!
//! Consumers:
//!     → stdout (pretty locally, JSON elsewhere)
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::init_metrics;
