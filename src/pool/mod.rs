//! Client and server pools.
//!
//! # Data Flow
//! ```text
//! Attach OK → client_pool.rs (client recorded as Attached)
//! Pop:
//!     → server_pool.rs (oldest idle server → Active)
//!     → none idle: client recorded as Pending, parked as a route waiter
//! Push:
//!     → oldest live waiter gets the server directly
//!     → otherwise server_pool.rs parks it as Idle
//! ```
//!
//! # Design Decisions
//! - Pools are plain data owned by a route; only the router actor touches them
//! - `Server` is moved, never shared, so one server has at most one holder
//! - Pool size caps newly registered servers, never returning ones

pub mod client;
pub mod client_pool;
pub mod server;
pub mod server_pool;

pub use client::{Client, ClientId, StartupParams};
pub use server::{Server, ServerId, ServerState};
