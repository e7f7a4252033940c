//! Route identity.

use std::fmt;

use bytes::Bytes;

/// The (database, user) key identifying a route.
///
/// Both fields are raw bytes as received from the client's startup packet;
/// equality and hashing are byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteId {
    database: Bytes,
    user: Bytes,
}

impl RouteId {
    pub fn new(database: impl Into<Bytes>, user: impl Into<Bytes>) -> Self {
        Self {
            database: database.into(),
            user: user.into(),
        }
    }

    pub fn database(&self) -> &[u8] {
        &self.database
    }

    pub fn user(&self) -> &[u8] {
        &self.user
    }

    /// Replace either half of the identity with a forced value.
    pub(crate) fn with_overrides(mut self, database: Option<&Bytes>, user: Option<&Bytes>) -> Self {
        if let Some(database) = database {
            self.database = database.clone();
        }
        if let Some(user) = user {
            self.user = user.clone();
        }
        self
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}",
            String::from_utf8_lossy(&self.user),
            String::from_utf8_lossy(&self.database)
        )
    }
}
