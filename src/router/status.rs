//! Call results returned to the session handler.

use std::fmt;

/// Outcome of an attach or pop call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStatus {
    Ok,
    /// No route template matches the requested database.
    NotFound,
    /// The route is at `client_max`.
    Limit,
    /// Anything else: bad input, router unavailable, timeout.
    Error,
}

impl RouteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteStatus::Ok => "ok",
            RouteStatus::NotFound => "not_found",
            RouteStatus::Limit => "limit",
            RouteStatus::Error => "error",
        }
    }
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A call that failed on the caller's side, before or after reaching the actor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("router inbound queue is closed")]
    QueueClosed,
    #[error("router dropped the reply")]
    ReplyDropped,
    #[error("router did not reply within {0} ms")]
    Timeout(u64),
    #[error("client is not attached to a route")]
    NotAttached,
}

impl CallError {
    /// Metric label for this failure.
    pub fn reason(&self) -> &'static str {
        match self {
            CallError::QueueClosed => "queue_closed",
            CallError::ReplyDropped => "reply_dropped",
            CallError::Timeout(_) => "timeout",
            CallError::NotAttached => "not_attached",
        }
    }
}

impl From<CallError> for RouteStatus {
    fn from(_: CallError) -> Self {
        RouteStatus::Error
    }
}
