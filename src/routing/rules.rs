//! Route template lookup.
//!
//! # Responsibilities
//! - Store compiled route templates in declaration order
//! - Find the template matching a requested database, or the default
//! - Resolve the route identity, applying forced overrides
//!
//! # Design Decisions
//! - Compiled once at router init, immutable afterwards
//! - First match wins; the default template is only a fallback
//! - Explicit NoMatch (`None`) rather than a silent catch-all

use std::sync::Arc;

use bytes::Bytes;

use crate::config::RouteConfig;
use crate::routing::matcher::{parse_pattern, Matcher};
use crate::routing::route_id::RouteId;

/// A route template with its compiled matcher and overrides.
#[derive(Debug)]
pub struct CompiledRoute {
    pub config: Arc<RouteConfig>,
    matcher: Box<dyn Matcher>,
    force_database: Option<Bytes>,
    force_user: Option<Bytes>,
}

impl CompiledRoute {
    fn compile(config: RouteConfig) -> Result<Self, String> {
        let matcher = parse_pattern(&config.database)?;
        let force_database = config.force_database.clone().map(Bytes::from);
        let force_user = config.force_user.clone().map(Bytes::from);
        Ok(Self {
            config: Arc::new(config),
            matcher,
            force_database,
            force_user,
        })
    }

    /// Build the identity a client with these startup parameters lands on.
    pub fn resolve(&self, database: &Bytes, user: &Bytes) -> RouteId {
        RouteId::new(database.clone(), user.clone())
            .with_overrides(self.force_database.as_ref(), self.force_user.as_ref())
    }
}

/// Ordered route templates plus an optional default.
#[derive(Debug, Default)]
pub struct RouteRules {
    routes: Vec<CompiledRoute>,
    default_route: Option<CompiledRoute>,
}

impl RouteRules {
    /// Compile templates. Patterns are expected to be validated already.
    pub fn from_config(routes: Vec<RouteConfig>, default_route: Option<RouteConfig>) -> Result<Self, String> {
        let routes = routes
            .into_iter()
            .map(CompiledRoute::compile)
            .collect::<Result<Vec<_>, _>>()?;
        let default_route = default_route.map(CompiledRoute::compile).transpose()?;

        tracing::debug!(
            routes = routes.len(),
            has_default = default_route.is_some(),
            "Route rules compiled"
        );

        Ok(Self {
            routes,
            default_route,
        })
    }

    /// Find the template for a requested database.
    pub fn match_database(&self, database: &[u8]) -> Option<&CompiledRoute> {
        self.routes
            .iter()
            .find(|r| r.matcher.matches(database))
            .or(self.default_route.as_ref())
    }

    pub fn len(&self) -> usize {
        self.routes.len() + usize::from(self.default_route.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RouteRules {
        let exact = RouteConfig::new("app", "app_db", "127.0.0.1:5432");
        let mut tenants = RouteConfig::new("tenants", "tenant_*", "127.0.0.1:5433");
        tenants.force_database = Some("tenants".into());
        tenants.force_user = Some("pooler".into());
        RouteRules::from_config(vec![exact, tenants], None).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let mut wide = RouteConfig::new("wide", "app*", "127.0.0.1:1");
        wide.client_max = 1;
        let narrow = RouteConfig::new("narrow", "app_db", "127.0.0.1:2");
        let rules = RouteRules::from_config(vec![wide, narrow], None).unwrap();

        assert_eq!(rules.match_database(b"app_db").unwrap().config.name, "wide");
    }

    #[test]
    fn test_no_match_without_default() {
        assert!(rules().match_database(b"other").is_none());
    }

    #[test]
    fn test_default_fallback() {
        let default = RouteConfig::new("fallback", "*", "127.0.0.1:9");
        let rules = RouteRules::from_config(vec![], Some(default)).unwrap();
        assert_eq!(rules.match_database(b"anything").unwrap().config.name, "fallback");
        assert_eq!(rules.len(), 1);
    }

    #[test]
    fn test_resolve_applies_overrides() {
        let rules = rules();
        let route = rules.match_database(b"tenant_7").unwrap();
        let id = route.resolve(&Bytes::from_static(b"tenant_7"), &Bytes::from_static(b"alice"));
        assert_eq!(id, RouteId::new(&b"tenants"[..], &b"pooler"[..]));

        let plain = rules.match_database(b"app_db").unwrap();
        let id = plain.resolve(&Bytes::from_static(b"app_db"), &Bytes::from_static(b"alice"));
        assert_eq!(id, RouteId::new(&b"app_db"[..], &b"alice"[..]));
    }
}
