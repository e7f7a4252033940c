//! Backend server connection handle.
//!
//! # Responsibilities
//! - Represent a single physical backend connection
//! - Carry a stable identity so pools can track its state
//!
//! The router never opens or closes connections; it only moves `Server`
//! values between a route's idle set and the client that checked them out.
//! Because a `Server` is moved rather than shared, a checked-out server can
//! only ever be held by one client.

use std::fmt;
use std::net::SocketAddr;
use std::time::Instant;

use uuid::Uuid;

/// Unique identifier of a backend connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ServerId(Uuid);

impl ServerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ServerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// State of a server within its route's pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    /// Parked in the pool, ready for checkout.
    Idle,
    /// Checked out by a client.
    Active,
}

/// A physical backend connection owned by the backend connection manager.
#[derive(Debug)]
pub struct Server {
    id: ServerId,
    /// Backend address this connection points to.
    pub addr: SocketAddr,
    /// When the connection was established.
    pub connected_at: Instant,
}

impl Server {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            id: ServerId::new(),
            addr,
            connected_at: Instant::now(),
        }
    }

    pub fn id(&self) -> ServerId {
        self.id
    }
}
