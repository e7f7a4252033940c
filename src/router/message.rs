//! Requests accepted by the router actor.

use tokio::sync::{mpsc, oneshot};

use crate::pool::client::{ClientId, StartupParams};
use crate::pool::server::Server;
use crate::router::status::RouteStatus;
use crate::routing::route::{RouteRef, RouteSnapshot};

/// Reply to an attach request.
#[derive(Debug)]
pub struct AttachReply {
    pub status: RouteStatus,
    pub route: Option<RouteRef>,
}

/// A single-use request, consumed exactly once by the actor.
#[derive(Debug)]
pub enum RouterMessage {
    /// Bind a client to a route.
    Attach {
        client: ClientId,
        startup: StartupParams,
        reply: oneshot::Sender<AttachReply>,
    },
    /// Check out a server from the client's route.
    Pop {
        route: RouteRef,
        client: ClientId,
        reply: oneshot::Sender<Server>,
    },
    /// Return a server to a route. Fire-and-forget.
    Push {
        route: RouteRef,
        client: Option<ClientId>,
        server: Server,
    },
    /// Release a client's admission slot, returning any server it holds.
    Detach {
        route: RouteRef,
        client: ClientId,
        server: Option<Server>,
    },
    /// Report every live route.
    Snapshot {
        reply: oneshot::Sender<Vec<RouteSnapshot>>,
    },
}

impl RouterMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            RouterMessage::Attach { .. } => "attach",
            RouterMessage::Pop { .. } => "pop",
            RouterMessage::Push { .. } => "push",
            RouterMessage::Detach { .. } => "detach",
            RouterMessage::Snapshot { .. } => "snapshot",
        }
    }
}

/// Sending half of the actor's inbound queue.
#[derive(Debug, Clone)]
pub(crate) enum Inbox {
    Bounded(mpsc::Sender<RouterMessage>),
    Unbounded(mpsc::UnboundedSender<RouterMessage>),
}

/// Receiving half of the actor's inbound queue.
#[derive(Debug)]
pub(crate) enum Outbox {
    Bounded(mpsc::Receiver<RouterMessage>),
    Unbounded(mpsc::UnboundedReceiver<RouterMessage>),
}

/// Create the inbound queue. `None` capacity means unbounded.
pub(crate) fn queue(capacity: Option<usize>) -> (Inbox, Outbox) {
    match capacity {
        Some(capacity) => {
            let (tx, rx) = mpsc::channel(capacity.max(1));
            (Inbox::Bounded(tx), Outbox::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (Inbox::Unbounded(tx), Outbox::Unbounded(rx))
        }
    }
}

impl Inbox {
    /// Enqueue a message, waiting for room if the queue is bounded.
    pub async fn send(&self, msg: RouterMessage) -> Result<(), RouterMessage> {
        match self {
            Inbox::Bounded(tx) => tx.send(msg).await.map_err(|e| e.0),
            Inbox::Unbounded(tx) => tx.send(msg).map_err(|e| e.0),
        }
    }

    /// Enqueue without waiting, for use from synchronous code such as `Drop`.
    ///
    /// When a bounded queue is full the message is handed to a spawned task
    /// that waits for room. Fails only if the router is gone or no runtime is
    /// available to spawn on.
    pub fn send_now(&self, msg: RouterMessage) -> Result<(), RouterMessage> {
        let tx = match self {
            Inbox::Unbounded(tx) => return tx.send(msg).map_err(|e| e.0),
            Inbox::Bounded(tx) => tx,
        };
        match tx.try_send(msg) {
            Ok(()) => Ok(()),
            Err(mpsc::error::TrySendError::Closed(msg)) => Err(msg),
            Err(mpsc::error::TrySendError::Full(msg)) => {
                let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                    return Err(msg);
                };
                let tx = tx.clone();
                runtime.spawn(async move {
                    let _ = tx.send(msg).await;
                });
                Ok(())
            }
        }
    }
}

impl Outbox {
    pub async fn recv(&mut self) -> Option<RouterMessage> {
        match self {
            Outbox::Bounded(rx) => rx.recv().await,
            Outbox::Unbounded(rx) => rx.recv().await,
        }
    }
}
