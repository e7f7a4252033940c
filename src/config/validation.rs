//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (pool sizes, queue capacity)
//! - Validate target addresses and database patterns
//! - Detect conflicting routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PoolerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{PoolerConfig, RouteConfig};
use crate::routing::matcher::parse_pattern;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g. `routes[1].target`).
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// One-line rendering of a batch of errors, for error messages.
pub(crate) fn describe_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

/// Validate a parsed configuration.
pub fn validate_config(config: &PoolerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.router.queue_capacity == Some(0) {
        errors.push(ValidationError::new(
            "router.queue_capacity",
            "bounded queue needs a capacity of at least 1",
        ));
    }

    let mut seen_patterns = HashSet::new();
    for (i, route) in config.routes.iter().enumerate() {
        let prefix = format!("routes[{}]", i);
        validate_route(&prefix, route, &mut errors);
        if !seen_patterns.insert(route.database.as_str()) {
            errors.push(ValidationError::new(
                format!("{}.database", prefix),
                format!("pattern '{}' already used by an earlier route", route.database),
            ));
        }
    }

    if let Some(default) = &config.default_route {
        validate_route("default_route", default, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(prefix: &str, route: &RouteConfig, errors: &mut Vec<ValidationError>) {
    if route.name.trim().is_empty() {
        errors.push(ValidationError::new(format!("{}.name", prefix), "must not be empty"));
    }

    if let Err(reason) = parse_pattern(&route.database) {
        errors.push(ValidationError::new(format!("{}.database", prefix), reason));
    }

    for (field, value) in [("force_database", &route.force_database), ("force_user", &route.force_user)] {
        if matches!(value, Some(v) if v.is_empty()) {
            errors.push(ValidationError::new(
                format!("{}.{}", prefix, field),
                "override must not be empty",
            ));
        }
    }

    if route.target.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            format!("{}.target", prefix),
            format!("'{}' is not a socket address", route.target),
        ));
    }

    if route.pool_size == 0 {
        errors.push(ValidationError::new(
            format!("{}.pool_size", prefix),
            "must be at least 1",
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&PoolerConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = PoolerConfig::default();
        config.router.queue_capacity = Some(0);
        let mut bad = RouteConfig::new("", "a*b", "not-an-address");
        bad.pool_size = 0;
        config.routes.push(bad);

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            vec![
                "router.queue_capacity",
                "routes[0].name",
                "routes[0].database",
                "routes[0].target",
                "routes[0].pool_size",
            ]
        );
    }

    #[test]
    fn test_duplicate_patterns_rejected() {
        let mut config = PoolerConfig::default();
        config.routes.push(RouteConfig::new("a", "app_db", "127.0.0.1:5432"));
        config.routes.push(RouteConfig::new("b", "app_db", "127.0.0.1:5433"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "routes[1].database");
    }

    #[test]
    fn test_empty_override_rejected() {
        let mut config = PoolerConfig::default();
        let mut route = RouteConfig::new("a", "app_db", "127.0.0.1:5432");
        route.force_user = Some(String::new());
        config.default_route = Some(route);

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "default_route.force_user");
    }

    #[test]
    fn test_zero_client_max_is_allowed() {
        let mut config = PoolerConfig::default();
        let mut route = RouteConfig::new("disabled", "legacy", "127.0.0.1:5432");
        route.client_max = 0;
        config.routes.push(route);

        assert!(validate_config(&config).is_ok());
    }
}
