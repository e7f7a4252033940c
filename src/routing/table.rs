//! Route table: every live route, keyed by identity.
//!
//! # Responsibilities
//! - Look up a route by its resolved identity
//! - Create a route on first use (create-if-absent)
//! - Resolve a client's startup parameters to a route via `RouteRules`
//!
//! # Design Decisions
//! - Owned exclusively by the router actor; no interior locking
//! - Routes live for the lifetime of the table
//! - A `RouteRef` handed out earlier must still name the same table entry

use std::collections::HashMap;

use crate::observability::metrics;
use crate::pool::client::StartupParams;
use crate::routing::route::{Route, RouteRef, RouteSnapshot};
use crate::routing::route_id::RouteId;
use crate::routing::rules::RouteRules;

/// Why a client could not be resolved to a route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("no route matches database '{0}'")]
    NotFound(String),
    #[error("startup parameters are missing database or user")]
    InvalidStartup,
}

#[derive(Debug)]
pub struct RouteTable {
    rules: RouteRules,
    routes: HashMap<RouteId, Route>,
}

impl RouteTable {
    pub fn new(rules: RouteRules) -> Self {
        Self {
            rules,
            routes: HashMap::new(),
        }
    }

    /// Resolve startup parameters to a route, creating it if absent.
    pub fn forward(&mut self, startup: &StartupParams) -> Result<&mut Route, RouteError> {
        if !startup.is_valid() {
            return Err(RouteError::InvalidStartup);
        }

        let template = self
            .rules
            .match_database(&startup.database)
            .ok_or_else(|| RouteError::NotFound(String::from_utf8_lossy(&startup.database).into_owned()))?;

        let id = template.resolve(&startup.database, &startup.user);
        let config = template.config.clone();
        let live = self.routes.len();

        Ok(self.routes.entry(id).or_insert_with_key(|id| {
            tracing::info!(
                route = %config.name,
                id = %id,
                target = %config.target,
                "Route created"
            );
            metrics::record_route_created(&config.name);
            metrics::record_routes(live + 1);
            Route::new(id.clone(), config)
        }))
    }

    /// Look up the table entry behind a previously handed-out ref.
    pub fn get_mut(&mut self, route: &RouteRef) -> Option<&mut Route> {
        self.routes
            .get_mut(&route.id)
            .filter(|r| r.handle().ptr_eq(route))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn snapshot(&self) -> Vec<RouteSnapshot> {
        let mut routes: Vec<_> = self.routes.values().map(Route::snapshot).collect();
        routes.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    fn table() -> RouteTable {
        let app = RouteConfig::new("app", "app_db", "127.0.0.1:5432");
        let mut shared = RouteConfig::new("shared", "tenant_*", "127.0.0.1:5433");
        shared.force_database = Some("tenants".into());
        shared.force_user = Some("pooler".into());
        RouteTable::new(RouteRules::from_config(vec![app, shared], None).unwrap())
    }

    #[test]
    fn test_same_identity_shares_route() {
        let mut table = table();
        let startup = StartupParams::new(&b"app_db"[..], &b"alice"[..]);
        let first = table.forward(&startup).unwrap().handle().clone();
        let second = table.forward(&startup).unwrap().handle().clone();
        assert!(first.ptr_eq(&second));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_distinct_users_get_distinct_routes() {
        let mut table = table();
        let a = table.forward(&StartupParams::new(&b"app_db"[..], &b"alice"[..])).unwrap().handle().clone();
        let b = table.forward(&StartupParams::new(&b"app_db"[..], &b"bob"[..])).unwrap().handle().clone();
        assert!(!a.ptr_eq(&b));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_override_collapses_identities() {
        let mut table = table();
        let a = table.forward(&StartupParams::new(&b"tenant_1"[..], &b"alice"[..])).unwrap().handle().clone();
        let b = table.forward(&StartupParams::new(&b"tenant_2"[..], &b"bob"[..])).unwrap().handle().clone();
        assert!(a.ptr_eq(&b));
        assert_eq!(a.id, RouteId::new(&b"tenants"[..], &b"pooler"[..]));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_not_found_creates_nothing() {
        let mut table = table();
        let err = table.forward(&StartupParams::new(&b"other"[..], &b"alice"[..])).unwrap_err();
        assert_eq!(err, RouteError::NotFound("other".into()));
        assert!(table.is_empty());
    }

    #[test]
    fn test_invalid_startup() {
        let mut table = table();
        let err = table.forward(&StartupParams::new(&b""[..], &b"alice"[..])).unwrap_err();
        assert_eq!(err, RouteError::InvalidStartup);
    }

    #[test]
    fn test_get_mut_rejects_stale_ref() {
        let mut table = table();
        let startup = StartupParams::new(&b"app_db"[..], &b"alice"[..]);
        let live = table.forward(&startup).unwrap().handle().clone();
        assert!(table.get_mut(&live).is_some());

        let config = live.config.clone();
        let stranger = Route::new(live.id.clone(), config);
        assert!(table.get_mut(stranger.handle()).is_none());
    }
}
