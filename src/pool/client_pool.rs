//! Per-route client pool.
//!
//! Tracks which clients are attached to a route and what each is doing.
//! The live count is what admission control compares against `client_max`.

use std::collections::HashMap;

use crate::pool::client::ClientId;

/// State of an attached client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Attached, holding no server.
    Attached,
    /// Waiting for a server to be pushed.
    Pending,
    /// Holding a checked-out server.
    Active,
}

#[derive(Debug, Default)]
pub struct ClientPool {
    clients: HashMap<ClientId, ClientState>,
}

impl ClientPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or move a client to `state`.
    pub fn set(&mut self, id: ClientId, state: ClientState) {
        self.clients.insert(id, state);
    }

    /// Drop a client from the pool, returning whether it was attached.
    pub fn remove(&mut self, id: ClientId) -> bool {
        self.clients.remove(&id).is_some()
    }

    pub fn state(&self, id: ClientId) -> Option<ClientState> {
        self.clients.get(&id).copied()
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    pub fn count(&self, state: ClientState) -> usize {
        self.clients.values().filter(|s| **s == state).count()
    }

    pub fn total(&self) -> usize {
        self.clients.len()
    }
}
