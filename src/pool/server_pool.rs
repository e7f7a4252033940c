//! Per-route server pool.
//!
//! # Responsibilities
//! - Park idle servers for reuse (FIFO, oldest first)
//! - Track which servers are checked out
//! - Enforce the route's pool size on newly registered servers

use std::collections::{HashMap, VecDeque};

use crate::pool::server::{Server, ServerId, ServerState};

/// Servers owned by one route.
#[derive(Debug)]
pub struct ServerPool {
    idle: VecDeque<Server>,
    states: HashMap<ServerId, ServerState>,
    capacity: usize,
}

impl ServerPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            idle: VecDeque::new(),
            states: HashMap::new(),
            capacity,
        }
    }

    /// Park a server as idle.
    ///
    /// A server the pool already tracks always comes back. An unknown server
    /// is a new registration and is refused (handed back) when the pool is full.
    pub fn put_idle(&mut self, server: Server) -> Result<(), Server> {
        let id = server.id();
        if !self.states.contains_key(&id) && self.states.len() >= self.capacity {
            return Err(server);
        }
        self.states.insert(id, ServerState::Idle);
        self.idle.push_back(server);
        Ok(())
    }

    /// Check out the oldest idle server.
    pub fn pop_idle(&mut self) -> Option<Server> {
        let server = self.idle.pop_front()?;
        self.states.insert(server.id(), ServerState::Active);
        Some(server)
    }

    /// Record a server as checked out without parking it first.
    ///
    /// Used when a pushed server goes straight to a waiting client.
    pub fn mark_active(&mut self, server: &Server) -> bool {
        let id = server.id();
        if !self.states.contains_key(&id) && self.states.len() >= self.capacity {
            return false;
        }
        self.states.insert(id, ServerState::Active);
        true
    }

    pub fn state(&self, id: ServerId) -> Option<ServerState> {
        self.states.get(&id).copied()
    }

    pub fn count(&self, state: ServerState) -> usize {
        self.states.values().filter(|s| **s == state).count()
    }

    pub fn total(&self) -> usize {
        self.states.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
