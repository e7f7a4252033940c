//! Caller-side facade over the router actor.
//!
//! Every call creates a private oneshot reply channel, enqueues a message on
//! the actor's shared inbound queue and awaits exactly one reply. Push and
//! detach are fire-and-forget.
//!
//! A call may end without reading its reply: the built-in call timeout
//! expires, or the caller drops the call future (outer timeout, `select!`,
//! task abort). The reply channel is then closed and anything the actor
//! already sent is handed back: a granted slot is detached, a server is
//! pushed back to its route.
//!
//! Failures on this side of the queue (closed queue, dropped reply, timeout)
//! are reported as `RouteStatus::Error` and counted under
//! `router_call_failures_total`, separate from statuses the actor produced.

use std::time::Duration;

use tokio::sync::oneshot;

use crate::observability::metrics;
use crate::pool::client::{Client, ClientId};
use crate::pool::server::Server;
use crate::router::message::{AttachReply, Inbox, RouterMessage};
use crate::router::status::{CallError, RouteStatus};
use crate::routing::route::{RouteRef, RouteSnapshot};

/// Cheaply cloneable handle used by session tasks to talk to the router.
#[derive(Debug, Clone)]
pub struct RouterHandle {
    inbox: Inbox,
    /// `None` waits forever.
    call_timeout: Option<Duration>,
}

impl RouterHandle {
    pub(crate) fn new(inbox: Inbox, call_timeout: Option<Duration>) -> Self {
        Self { inbox, call_timeout }
    }

    /// Bind a client to a route.
    ///
    /// On `Ok` the client's route reference is set. A client that is already
    /// attached is rejected with `Error`.
    pub async fn attach(&self, client: &mut Client) -> RouteStatus {
        if client.route.is_some() {
            tracing::warn!(client_id = %client.id(), "Client already attached");
            return RouteStatus::Error;
        }
        match self.call_attach(client).await {
            Ok(reply) => {
                if let Some(route) = reply.route {
                    client.route = Some(route);
                }
                reply.status
            }
            Err(e) => self.fail("attach", e),
        }
    }

    async fn call_attach(&self, client: &Client) -> Result<AttachReply, CallError> {
        let (reply, rx) = oneshot::channel();
        let mut pending = self.pending(rx, Some(Caller { client: client.id(), route: None }));
        self.enqueue(RouterMessage::Attach {
            client: client.id(),
            startup: client.startup.clone(),
            reply,
        })
        .await?;
        pending.wait(self.call_timeout).await
    }

    /// Check out a server from the client's route.
    ///
    /// Waits for a push when no server is idle. On `Ok` the server is stored
    /// on the client.
    pub async fn pop(&self, client: &mut Client) -> RouteStatus {
        match self.call_pop(client).await {
            Ok(server) => {
                client.server = Some(server);
                RouteStatus::Ok
            }
            Err(e) => self.fail("pop", e),
        }
    }

    async fn call_pop(&self, client: &Client) -> Result<Server, CallError> {
        let route = client.route.clone().ok_or(CallError::NotAttached)?;
        let (reply, rx) = oneshot::channel();
        let caller = Caller { client: client.id(), route: Some(route.clone()) };
        let mut pending = self.pending(rx, Some(caller));
        self.enqueue(RouterMessage::Pop { route, client: client.id(), reply }).await?;
        pending.wait(self.call_timeout).await
    }

    /// Return the client's checked-out server to its route.
    ///
    /// The client's server reference is cleared whether or not the router is
    /// still running.
    pub async fn push(&self, client: &mut Client) {
        let Some(server) = client.server.take() else {
            return;
        };
        let Some(route) = client.route.clone() else {
            tracing::error!(client_id = %client.id(), server_id = %server.id(), "Push from unattached client, closing server");
            return;
        };
        let msg = RouterMessage::Push { route, client: Some(client.id()), server };
        if let Err(e) = self.enqueue(msg).await {
            self.fail("push", e);
        }
    }

    /// Hand a freshly opened backend connection to a route's pool.
    pub async fn register_server(&self, route: &RouteRef, server: Server) {
        let msg = RouterMessage::Push { route: route.clone(), client: None, server };
        if let Err(e) = self.enqueue(msg).await {
            self.fail("register_server", e);
        }
    }

    /// Release the client's admission slot (and any server it still holds).
    ///
    /// Called when the client session ends. Clears the route reference.
    pub async fn detach(&self, client: &mut Client) {
        let Some(route) = client.route.take() else {
            return;
        };
        let server = client.server.take();
        let msg = RouterMessage::Detach { route, client: client.id(), server };
        if let Err(e) = self.enqueue(msg).await {
            self.fail("detach", e);
        }
    }

    /// Point-in-time view of every live route.
    pub async fn snapshot(&self) -> Result<Vec<RouteSnapshot>, CallError> {
        let (reply, rx) = oneshot::channel();
        let mut pending = self.pending(rx, None);
        self.enqueue(RouterMessage::Snapshot { reply }).await?;
        pending.wait(self.call_timeout).await
    }

    async fn enqueue(&self, msg: RouterMessage) -> Result<(), CallError> {
        self.inbox.send(msg).await.map_err(|_| CallError::QueueClosed)
    }

    fn pending<T: Reclaim>(&self, rx: oneshot::Receiver<T>, caller: Option<Caller>) -> Pending<T> {
        Pending {
            rx,
            inbox: self.inbox.clone(),
            caller,
            taken: false,
        }
    }

    fn fail(&self, op: &'static str, error: CallError) -> RouteStatus {
        tracing::warn!(op, origin = "facade", error = %error, "Router call failed");
        metrics::record_call_failure(op, error.reason());
        error.into()
    }
}

/// Who is waiting on a reply, and on which route.
struct Caller {
    client: ClientId,
    route: Option<RouteRef>,
}

/// A reply that still owns router state until the caller takes it.
trait Reclaim: Sized {
    /// The message that gives the state back, if there is any to give.
    fn reclaim(self, caller: Caller) -> Option<RouterMessage>;
}

impl Reclaim for AttachReply {
    fn reclaim(self, caller: Caller) -> Option<RouterMessage> {
        let route = self.route?;
        Some(RouterMessage::Detach { route, client: caller.client, server: None })
    }
}

impl Reclaim for Server {
    fn reclaim(self, caller: Caller) -> Option<RouterMessage> {
        let route = caller.route?;
        Some(RouterMessage::Push { route, client: Some(caller.client), server: self })
    }
}

impl Reclaim for Vec<RouteSnapshot> {
    fn reclaim(self, _: Caller) -> Option<RouterMessage> {
        None
    }
}

/// Reply channel of an in-flight call.
///
/// Dropped before the reply was taken, it closes the channel and hands any
/// reply that already arrived back to the router.
struct Pending<T: Reclaim> {
    rx: oneshot::Receiver<T>,
    inbox: Inbox,
    caller: Option<Caller>,
    taken: bool,
}

impl<T: Reclaim> Pending<T> {
    async fn wait(&mut self, limit: Option<Duration>) -> Result<T, CallError> {
        let received = match limit {
            None => (&mut self.rx).await,
            Some(limit) => tokio::time::timeout(limit, &mut self.rx)
                .await
                .map_err(|_| CallError::Timeout(limit.as_millis() as u64))?,
        };
        let reply = received.map_err(|_| CallError::ReplyDropped)?;
        self.taken = true;
        Ok(reply)
    }
}

impl<T: Reclaim> Drop for Pending<T> {
    fn drop(&mut self) {
        if self.taken {
            return;
        }
        // Stop the actor from sending, then take back anything already sent.
        self.rx.close();
        let (Ok(reply), Some(caller)) = (self.rx.try_recv(), self.caller.take()) else {
            return;
        };
        let client = caller.client;
        let Some(msg) = reply.reclaim(caller) else {
            return;
        };
        let kind = msg.kind();
        match self.inbox.send_now(msg) {
            Ok(()) => tracing::debug!(client_id = %client, kind, "Unread reply handed back to router"),
            Err(_) => tracing::warn!(client_id = %client, kind, "Router gone, unread reply discarded"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::RouteConfig;
    use crate::pool::client::StartupParams;
    use crate::router::message::{queue, Outbox};
    use crate::routing::route::Route;
    use crate::routing::route_id::RouteId;

    fn scripted(call_timeout: Option<Duration>) -> (RouterHandle, Outbox) {
        let (inbox, outbox) = queue(None);
        (RouterHandle::new(inbox, call_timeout), outbox)
    }

    fn route() -> RouteRef {
        let config = RouteConfig::new("app", "app_db", "127.0.0.1:5432");
        Route::new(RouteId::new(&b"app_db"[..], &b"alice"[..]), Arc::new(config))
            .handle()
            .clone()
    }

    fn client() -> Client {
        Client::new(StartupParams::new(&b"app_db"[..], &b"alice"[..]))
    }

    #[tokio::test]
    async fn test_dropped_attach_detaches_granted_slot() {
        let (router, mut outbox) = scripted(None);
        let route = route();
        let mut client = client();

        {
            let mut call = Box::pin(router.attach(&mut client));
            assert!(tokio::time::timeout(Duration::ZERO, &mut call).await.is_err());
            let Some(RouterMessage::Attach { reply, .. }) = outbox.recv().await else {
                panic!("expected attach");
            };
            reply
                .send(AttachReply { status: RouteStatus::Ok, route: Some(route.clone()) })
                .unwrap();
        }

        assert!(client.route().is_none());
        match outbox.recv().await {
            Some(RouterMessage::Detach { route: released, client: id, server: None }) => {
                assert!(released.ptr_eq(&route));
                assert_eq!(id, client.id());
            }
            other => panic!("expected detach, got {:?}", other.map(|m| m.kind())),
        }
    }

    #[tokio::test]
    async fn test_dropped_attach_without_grant_sends_nothing() {
        let (router, mut outbox) = scripted(None);
        let mut client = client();

        {
            let mut call = Box::pin(router.attach(&mut client));
            assert!(tokio::time::timeout(Duration::ZERO, &mut call).await.is_err());
            let Some(RouterMessage::Attach { reply, .. }) = outbox.recv().await else {
                panic!("expected attach");
            };
            reply.send(AttachReply { status: RouteStatus::Limit, route: None }).unwrap();
        }

        let (reply, _) = oneshot::channel();
        router.inbox.send_now(RouterMessage::Snapshot { reply }).unwrap();
        assert_eq!(outbox.recv().await.unwrap().kind(), "snapshot");
    }

    #[tokio::test]
    async fn test_dropped_pop_pushes_server_back() {
        let (router, mut outbox) = scripted(None);
        let route = route();
        let mut client = client();
        client.route = Some(route.clone());
        let server = Server::new("127.0.0.1:5432".parse().unwrap());
        let server_id = server.id();

        {
            let mut call = Box::pin(router.pop(&mut client));
            assert!(tokio::time::timeout(Duration::ZERO, &mut call).await.is_err());
            let Some(RouterMessage::Pop { reply, .. }) = outbox.recv().await else {
                panic!("expected pop");
            };
            reply.send(server).unwrap();
        }

        assert!(client.server().is_none());
        match outbox.recv().await {
            Some(RouterMessage::Push { route: back, client: from, server }) => {
                assert!(back.ptr_eq(&route));
                assert_eq!(from, Some(client.id()));
                assert_eq!(server.id(), server_id);
            }
            other => panic!("expected push, got {:?}", other.map(|m| m.kind())),
        }
    }

    #[tokio::test]
    async fn test_call_timeout_closes_reply_channel() {
        let (router, mut outbox) = scripted(Some(Duration::from_millis(20)));
        let mut client = client();

        assert_eq!(router.attach(&mut client).await, RouteStatus::Error);
        assert!(client.route().is_none());

        // The unanswered request is still queued, but nobody listens any more.
        let Some(RouterMessage::Attach { reply, .. }) = outbox.recv().await else {
            panic!("expected attach");
        };
        assert!(reply.is_closed());
    }
}
