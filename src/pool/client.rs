//! Client session state as seen by the router.
//!
//! The session handler owns the `Client`. The router reads its startup
//! parameters and, through the facade, writes its route and server
//! references once the actor has replied.

use std::fmt;

use bytes::Bytes;
use uuid::Uuid;

use crate::pool::server::Server;
use crate::routing::route::RouteRef;

/// Unique identifier of a client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Startup parameters resolved by the frontend protocol handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupParams {
    pub database: Bytes,
    pub user: Bytes,
}

impl StartupParams {
    pub fn new(database: impl Into<Bytes>, user: impl Into<Bytes>) -> Self {
        Self {
            database: database.into(),
            user: user.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.database.is_empty() && !self.user.is_empty()
    }
}

/// A client session.
#[derive(Debug)]
pub struct Client {
    id: ClientId,
    pub startup: StartupParams,
    pub(crate) route: Option<RouteRef>,
    pub(crate) server: Option<Server>,
}

impl Client {
    pub fn new(startup: StartupParams) -> Self {
        Self {
            id: ClientId::new(),
            startup,
            route: None,
            server: None,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// The route this client is attached to, if any.
    pub fn route(&self) -> Option<&RouteRef> {
        self.route.as_ref()
    }

    /// The backend server currently checked out by this client.
    pub fn server(&self) -> Option<&Server> {
        self.server.as_ref()
    }
}
