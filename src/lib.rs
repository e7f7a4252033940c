//! Routing core of a database connection pooler.
//!
//! Binds authenticated client sessions to routes, enforces per-route
//! admission limits and arbitrates hand-back of backend connections. All
//! routing state lives in a single router actor; session tasks talk to it
//! through [`RouterHandle`].

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod pool;
pub mod router;
pub mod routing;

pub use config::schema::PoolerConfig;
pub use lifecycle::Shutdown;
pub use pool::{Client, Server, StartupParams};
pub use router::{Router, RouterHandle, RouteStatus};
