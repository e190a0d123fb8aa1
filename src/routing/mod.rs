//! Routing subsystem: path → protection tier.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → matcher.rs (normalize path, evaluate prefix/method conditions)
//!     → table.rs (longest-prefix lookup)
//!     → Return: RouteTier (never "no match")
//!
//! Table Compilation (at startup):
//!     RouteTableConfig
//!     → Validate prefixes and methods (errors are fatal)
//!     → Sort by specificity
//!     → Freeze as immutable Arc<RouteTable>
//! ```
//!
//! # Design Decisions
//! - Table compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: same input always yields the same tier
//! - Unmatched paths get the default tier for safe methods (fail-open for
//!   reads) and the mutating default tier otherwise (fail-closed for writes)

pub mod matcher;
pub mod table;
pub mod tier;

pub use table::{RouteTable, RouteTableError};
pub use tier::RouteTier;
