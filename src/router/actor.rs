//! The router actor.
//!
//! One task owns the route table and processes requests strictly one at a
//! time, in arrival order. Every check-then-act on shared routing state
//! (admission count, route creation, server hand-off) happens inside a single
//! turn, so no locking is needed and no two callers can race.

use tokio::sync::broadcast;

use crate::observability::metrics;
use crate::pool::client::{ClientId, StartupParams};
use crate::pool::server::Server;
use crate::router::message::{AttachReply, Outbox, RouterMessage};
use crate::router::status::RouteStatus;
use crate::routing::route::{PopOutcome, PushOutcome, RouteRef};
use crate::routing::table::{RouteError, RouteTable};

pub(crate) struct RouterActor {
    table: RouteTable,
    inbox: Outbox,
}

impl RouterActor {
    pub fn new(table: RouteTable, inbox: Outbox) -> Self {
        Self { table, inbox }
    }

    /// Process messages until every handle is dropped or shutdown fires.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) -> RouteTable {
        tracing::info!("Router started");

        // A dropped coordinator means nobody can ask us to stop; keep serving.
        let mut listening = true;
        loop {
            let msg = tokio::select! {
                msg = self.inbox.recv() => match msg {
                    Some(msg) => msg,
                    None => {
                        tracing::info!("Router inbound queue closed");
                        break;
                    }
                },
                signal = shutdown.recv(), if listening => match signal {
                    Err(broadcast::error::RecvError::Closed) => {
                        listening = false;
                        continue;
                    }
                    _ => {
                        tracing::info!("Router received shutdown signal, exiting loop");
                        break;
                    }
                }
            };
            self.handle(msg);
        }

        tracing::info!(routes = self.table.len(), "Router stopped");
        self.table
    }

    fn handle(&mut self, msg: RouterMessage) {
        tracing::trace!(kind = msg.kind(), "Router message");
        match msg {
            RouterMessage::Attach { client, startup, reply } => {
                let attach = self.attach(client, &startup);
                let status = attach.status;
                match reply.send(attach) {
                    Ok(()) => metrics::record_attach(status),
                    // Caller gave up; undo the binding so the slot is not leaked.
                    Err(_) => self.abandon_attach(client, &startup),
                }
            }
            RouterMessage::Pop { route, client, reply } => self.pop(&route, client, reply),
            RouterMessage::Push { route, client, server } => self.push(&route, client, server),
            RouterMessage::Detach { route, client, server } => self.detach(&route, client, server),
            RouterMessage::Snapshot { reply } => {
                let _ = reply.send(self.table.snapshot());
            }
        }
    }

    fn attach(&mut self, client: ClientId, startup: &StartupParams) -> AttachReply {
        let route = match self.table.forward(startup) {
            Ok(route) => route,
            Err(RouteError::NotFound(database)) => {
                tracing::debug!(client_id = %client, database = %database, "No route matched");
                return AttachReply { status: RouteStatus::NotFound, route: None };
            }
            Err(e) => {
                tracing::warn!(client_id = %client, error = %e, "Attach rejected");
                return AttachReply { status: RouteStatus::Error, route: None };
            }
        };

        if !route.attach(client) {
            let config = &route.handle().config;
            tracing::info!(
                route = %config.name,
                target = %config.target,
                client_max = config.client_max,
                "Route client_max reached"
            );
            return AttachReply { status: RouteStatus::Limit, route: None };
        }

        let handle = route.handle().clone();
        metrics::record_route_clients(&handle.id, route.clients().total());
        tracing::debug!(client_id = %client, route = %handle.id, "Client attached");
        AttachReply { status: RouteStatus::Ok, route: Some(handle) }
    }

    fn abandon_attach(&mut self, client: ClientId, startup: &StartupParams) {
        if let Ok(route) = self.table.forward(startup) {
            if route.detach(client) {
                tracing::debug!(client_id = %client, "Attach reply undeliverable, client released");
                metrics::record_route_clients(&route.handle().id, route.clients().total());
            }
        }
    }

    fn pop(&mut self, route: &RouteRef, client: ClientId, reply: tokio::sync::oneshot::Sender<Server>) {
        let Some(entry) = self.table.get_mut(route) else {
            tracing::error!(client_id = %client, route = %route.id, "Pop for unknown route");
            return;
        };
        match entry.pop(client, reply) {
            PopOutcome::Served => {}
            PopOutcome::Queued => {
                tracing::debug!(client_id = %client, route = %route.id, waiters = entry.waiters(), "No idle server, client queued");
                metrics::record_pop_waiters(&route.id, entry.waiters());
            }
            PopOutcome::NotAttached => {
                tracing::error!(client_id = %client, route = %route.id, "Pop from client not attached to route");
            }
        }
    }

    fn push(&mut self, route: &RouteRef, client: Option<ClientId>, server: Server) {
        let server_id = server.id();
        let Some(entry) = self.table.get_mut(route) else {
            tracing::error!(server_id = %server_id, route = %route.id, "Push for unknown route, closing server");
            return;
        };
        match entry.push(client, server) {
            PushOutcome::Handed(waiter) => {
                tracing::debug!(server_id = %server_id, client_id = %waiter, "Server handed to waiter");
                metrics::record_pop_waiters(&route.id, entry.waiters());
            }
            PushOutcome::Parked => {
                tracing::trace!(server_id = %server_id, route = %route.id, "Server idle");
            }
            PushOutcome::Rejected => {
                tracing::warn!(
                    server_id = %server_id,
                    route = %route.id,
                    pool_size = route.config.pool_size,
                    "Route pool full, closing server"
                );
            }
        }
    }

    fn detach(&mut self, route: &RouteRef, client: ClientId, server: Option<Server>) {
        if let Some(server) = server {
            self.push(route, Some(client), server);
        }
        let Some(entry) = self.table.get_mut(route) else {
            tracing::error!(client_id = %client, route = %route.id, "Detach from unknown route");
            return;
        };
        if entry.detach(client) {
            tracing::debug!(client_id = %client, route = %route.id, "Client detached");
            metrics::record_route_clients(&route.id, entry.clients().total());
        } else {
            tracing::warn!(client_id = %client, route = %route.id, "Detach for client not attached");
        }
    }
}
