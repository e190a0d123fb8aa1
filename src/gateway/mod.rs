//! Gateway decision subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request
//!     → state.rs (extract credential, verify, fold failures into None)
//!     → routing (method + path → RouteTier)
//!     → decision.rs (Session.kind × RouteTier → Allow | AttachUpgradeFlag | Redirect)
//!     → middleware.rs
//!         Redirect          → 307 to the login target, handler never runs
//!         Allow / Upgrade   → handler runs with Session, CspNonce (and UpgradeSignal)
//!     → decision headers + security headers (+ Set-Cookie clear) on the response
//! ```
//!
//! # Design Decisions
//! - The decision is recomputed on every request; nothing is cached across requests
//! - Verification failures are invisible to the user: they degrade to `None`
//! - The upgrade flag never navigates; the page renders and the client shows a modal
//! - Modal visuals and post-upgrade data merging belong to the client, not here

pub mod decision;
pub mod middleware;
pub mod state;

pub use decision::{Action, DecisionEngine, GatewayDecision, UpgradeSignal};
pub use middleware::gateway_middleware;
pub use state::{Gateway, Resolution};
