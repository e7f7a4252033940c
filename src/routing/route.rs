//! A live route: identity, template, attached clients and pooled servers.
//!
//! # Responsibilities
//! - Admission control against `client_max`
//! - Hand out idle servers, or park the caller as a FIFO waiter
//! - Take servers back, waking the oldest live waiter first
//!
//! # Design Decisions
//! - `Route` is plain data owned by the route table inside the router actor;
//!   callers only ever see the immutable `RouteRef`
//! - A waiter whose caller gave up (reply channel closed) is skipped, and a
//!   server that could not be delivered is recovered, never lost

use std::collections::VecDeque;
use std::ops::Deref;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;

use crate::config::RouteConfig;
use crate::pool::client::ClientId;
use crate::pool::client_pool::{ClientPool, ClientState};
use crate::pool::server::{Server, ServerState};
use crate::pool::server_pool::ServerPool;
use crate::routing::route_id::RouteId;

/// Immutable part of a route, shared with attached clients.
#[derive(Debug)]
pub struct RouteInfo {
    pub id: RouteId,
    pub config: Arc<RouteConfig>,
}

/// Shared reference to a route. Two refs are the same route iff `ptr_eq`.
#[derive(Debug, Clone)]
pub struct RouteRef(Arc<RouteInfo>);

impl RouteRef {
    pub fn ptr_eq(&self, other: &RouteRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for RouteRef {
    type Target = RouteInfo;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A Pop caller parked until a server is pushed.
#[derive(Debug)]
pub(crate) struct Waiter {
    client: ClientId,
    reply: oneshot::Sender<Server>,
}

/// Result of a pop against a route.
#[derive(Debug, PartialEq, Eq)]
pub enum PopOutcome {
    /// An idle server was sent to the caller.
    Served,
    /// No idle server; the caller waits for a push.
    Queued,
    /// The client is not attached to this route.
    NotAttached,
}

/// Result of a push against a route.
#[derive(Debug, PartialEq, Eq)]
pub enum PushOutcome {
    /// Given straight to a waiting client.
    Handed(ClientId),
    /// Parked as idle.
    Parked,
    /// Refused: the pool is full. The server is dropped.
    Rejected,
}

/// Point-in-time view of one route.
#[derive(Debug, Clone, Serialize)]
pub struct RouteSnapshot {
    pub name: String,
    pub id: String,
    pub target: String,
    pub clients: usize,
    /// Attached clients currently holding a server.
    pub clients_active: usize,
    pub client_max: usize,
    pub servers_idle: usize,
    pub servers_active: usize,
    pub waiters: usize,
}

/// Mutable state of a route, owned by the router actor.
#[derive(Debug)]
pub struct Route {
    info: RouteRef,
    clients: ClientPool,
    servers: ServerPool,
    waiters: VecDeque<Waiter>,
}

impl Route {
    pub fn new(id: RouteId, config: Arc<RouteConfig>) -> Self {
        let servers = ServerPool::new(config.pool_size);
        Self {
            info: RouteRef(Arc::new(RouteInfo { id, config })),
            clients: ClientPool::new(),
            servers,
            waiters: VecDeque::new(),
        }
    }

    pub fn handle(&self) -> &RouteRef {
        &self.info
    }

    pub fn clients(&self) -> &ClientPool {
        &self.clients
    }

    pub fn servers(&self) -> &ServerPool {
        &self.servers
    }

    pub fn waiters(&self) -> usize {
        self.waiters.len()
    }

    /// Attach a client unless the route is at capacity.
    pub fn attach(&mut self, client: ClientId) -> bool {
        if self.clients.total() >= self.info.config.client_max {
            return false;
        }
        self.clients.set(client, ClientState::Attached);
        true
    }

    /// Release a client's admission slot.
    pub fn detach(&mut self, client: ClientId) -> bool {
        self.waiters.retain(|w| w.client != client);
        self.clients.remove(client)
    }

    /// Check out a server for `client`, or queue it as a waiter.
    pub(crate) fn pop(&mut self, client: ClientId, reply: oneshot::Sender<Server>) -> PopOutcome {
        if !self.clients.contains(client) {
            return PopOutcome::NotAttached;
        }
        self.prune_waiters();

        if let Some(server) = self.servers.pop_idle() {
            match reply.send(server) {
                Ok(()) => {
                    self.clients.set(client, ClientState::Active);
                    return PopOutcome::Served;
                }
                Err(server) => {
                    // Caller already gone; the server goes back to the pool.
                    let _ = self.servers.put_idle(server);
                    return PopOutcome::Served;
                }
            }
        }

        self.clients.set(client, ClientState::Pending);
        self.waiters.push_back(Waiter { client, reply });
        PopOutcome::Queued
    }

    /// Return a server to the route. `from` is the client giving it back.
    pub fn push(&mut self, from: Option<ClientId>, mut server: Server) -> PushOutcome {
        if let Some(client) = from {
            if self.clients.state(client) == Some(ClientState::Active) {
                self.clients.set(client, ClientState::Attached);
            }
        }

        if self.servers.state(server.id()).is_none() && self.servers.total() >= self.servers.capacity() {
            return PushOutcome::Rejected;
        }

        while let Some(waiter) = self.waiters.pop_front() {
            if waiter.reply.is_closed() {
                self.reset_pending(waiter.client);
                continue;
            }
            self.servers.mark_active(&server);
            match waiter.reply.send(server) {
                Ok(()) => {
                    self.clients.set(waiter.client, ClientState::Active);
                    return PushOutcome::Handed(waiter.client);
                }
                Err(recovered) => {
                    self.reset_pending(waiter.client);
                    server = recovered;
                }
            }
        }

        match self.servers.put_idle(server) {
            Ok(()) => PushOutcome::Parked,
            Err(_) => PushOutcome::Rejected,
        }
    }

    pub fn snapshot(&self) -> RouteSnapshot {
        let config = &self.info.config;
        RouteSnapshot {
            name: config.name.clone(),
            id: self.info.id.to_string(),
            target: config.target.clone(),
            clients: self.clients.total(),
            clients_active: self.clients.count(ClientState::Active),
            client_max: config.client_max,
            servers_idle: self.servers.count(ServerState::Idle),
            servers_active: self.servers.count(ServerState::Active),
            waiters: self.waiters.len(),
        }
    }

    fn prune_waiters(&mut self) {
        let mut abandoned = Vec::new();
        self.waiters.retain(|w| {
            if w.reply.is_closed() {
                abandoned.push(w.client);
                false
            } else {
                true
            }
        });
        for client in abandoned {
            self.reset_pending(client);
        }
    }

    fn reset_pending(&mut self, client: ClientId) {
        if self.clients.state(client) == Some(ClientState::Pending) {
            self.clients.set(client, ClientState::Attached);
        }
    }
}
