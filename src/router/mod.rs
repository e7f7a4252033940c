//! Router actor subsystem.
//!
//! # Data Flow
//! ```text
//! Session task                          Router actor (single task)
//!     RouterHandle::attach/pop
//!     → oneshot reply channel
//!     → RouterMessage ──── inbound queue (FIFO) ───▶ RouterActor::handle
//!                                                     → RouteTable (forward,
//!                                                       admission, pools)
//!     ◀──────────── reply (status / server) ─────────
//!
//!     RouterHandle::push/detach ── fire-and-forget ──▶ pools updated,
//!                                                     waiters woken
//! ```
//!
//! # Design Decisions
//! - The actor is the only owner of the route table; callers share nothing
//! - Messages are processed one at a time, so admission checks cannot race
//! - The reply channel lives for exactly one call and is safe to abandon
//! - "No timeout" is an explicit configuration value, not a sentinel

pub mod actor;
pub mod handle;
pub mod message;
pub mod status;

use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::config::PoolerConfig;
use crate::routing::rules::RouteRules;
use crate::routing::table::RouteTable;

pub use handle::RouterHandle;
pub use message::{AttachReply, RouterMessage};
pub use status::{CallError, RouteStatus};

use actor::RouterActor;
use message::queue;

/// Error building the router.
#[derive(Debug, thiserror::Error)]
pub enum RouterInitError {
    #[error("invalid route pattern: {0}")]
    Pattern(String),
}

/// An initialized, not yet running router.
///
/// `init` builds the empty route table and the inbound queue; `start`
/// consumes the router and spawns the actor, so it can only run once.
pub struct Router {
    actor: RouterActor,
    handle: RouterHandle,
}

impl Router {
    pub fn init(config: &PoolerConfig) -> Result<Self, RouterInitError> {
        let rules = RouteRules::from_config(config.routes.clone(), config.default_route.clone())
            .map_err(RouterInitError::Pattern)?;
        let (inbox, outbox) = queue(config.router.queue_capacity);
        let call_timeout = config.router.call_timeout_ms.map(Duration::from_millis);

        tracing::info!(
            routes = rules.len(),
            queue_capacity = ?config.router.queue_capacity,
            call_timeout_ms = ?config.router.call_timeout_ms,
            "Router initialized"
        );

        Ok(Self {
            actor: RouterActor::new(RouteTable::new(rules), outbox),
            handle: RouterHandle::new(inbox, call_timeout),
        })
    }

    /// A handle for callers. Handles can be cloned freely.
    pub fn handle(&self) -> RouterHandle {
        self.handle.clone()
    }

    /// Spawn the actor loop.
    ///
    /// The loop ends when `shutdown` fires or when every handle (including
    /// the one kept here, dropped on start) is gone. The join handle yields
    /// the final route table.
    pub fn start(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<RouteTable> {
        let Router { actor, .. } = self;
        tokio::spawn(actor.run(shutdown))
    }
}
