//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Client startup parameters (database, user)
//!     → rules.rs (first template whose pattern matches, else default)
//!     → matcher.rs (evaluate the database pattern)
//!     → route_id.rs (candidate identity, forced overrides applied)
//!     → table.rs (existing route, or create-if-absent)
//!     → Return: Route or NotFound
//!
//! Route Compilation (at router init):
//!     RouteConfig[] + default
//!     → Compile matchers
//!     → Freeze as immutable RouteRules
//! ```
//!
//! # Design Decisions
//! - Templates compiled at init, immutable at runtime
//! - No regex (exact / prefix / any)
//! - Deterministic: same input always resolves to the same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod route;
pub mod route_id;
pub mod rules;
pub mod table;

pub use route::{Route, RouteRef, RouteSnapshot};
pub use route_id::RouteId;
pub use rules::RouteRules;
pub use table::{RouteError, RouteTable};
