//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the pooler
//! routing core. All types derive Serde traits for deserialization from
//! config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the pooler router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PoolerConfig {
    /// Router actor settings (inbound queue, call timeout).
    pub router: RouterConfig,

    /// Ordered route templates. First match wins.
    pub routes: Vec<RouteConfig>,

    /// Fallback template used when no pattern matches.
    pub default_route: Option<RouteConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Router actor configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Capacity of the actor's inbound queue. `None` means unbounded.
    pub queue_capacity: Option<usize>,

    /// Maximum time a facade call waits for the actor's reply, in
    /// milliseconds. `None` means wait forever.
    pub call_timeout_ms: Option<u64>,
}

/// Route template mapping a requested database onto a backend target.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Database name pattern: exact name, `prefix*`, or `*`.
    pub database: String,

    /// Database forced into the route identity, replacing the requested one.
    #[serde(default)]
    pub force_database: Option<String>,

    /// User forced into the route identity, replacing the requested one.
    #[serde(default)]
    pub force_user: Option<String>,

    /// Backend address (e.g., "127.0.0.1:5432").
    pub target: String,

    /// Maximum concurrently attached clients. 0 disables the route.
    #[serde(default = "default_client_max")]
    pub client_max: usize,

    /// Maximum number of server connections tracked by the route's pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

impl RouteConfig {
    /// Minimal template used by tests and the CLI.
    pub fn new(name: impl Into<String>, database: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            database: database.into(),
            force_database: None,
            force_user: None,
            target: target.into(),
            client_max: default_client_max(),
            pool_size: default_pool_size(),
        }
    }
}

fn default_client_max() -> usize {
    100
}

fn default_pool_size() -> usize {
    10
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: PoolerConfig = toml::from_str(
            r#"
            [[routes]]
            name = "app"
            database = "app_db"
            target = "127.0.0.1:5432"
            "#,
        )
        .unwrap();

        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].client_max, 100);
        assert_eq!(config.routes[0].pool_size, 10);
        assert!(config.routes[0].force_user.is_none());
        assert!(config.default_route.is_none());
        assert!(config.router.queue_capacity.is_none());
        assert!(config.router.call_timeout_ms.is_none());
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_full_toml() {
        let config: PoolerConfig = toml::from_str(
            r#"
            [router]
            queue_capacity = 256
            call_timeout_ms = 500

            [[routes]]
            name = "shared"
            database = "tenant_*"
            force_database = "tenants"
            force_user = "pooler"
            target = "10.0.0.5:5432"
            client_max = 2
            pool_size = 4

            [default_route]
            name = "fallback"
            database = "*"
            target = "10.0.0.9:5432"
            "#,
        )
        .unwrap();

        assert_eq!(config.router.queue_capacity, Some(256));
        assert_eq!(config.router.call_timeout_ms, Some(500));
        let shared = &config.routes[0];
        assert_eq!(shared.force_database.as_deref(), Some("tenants"));
        assert_eq!(shared.force_user.as_deref(), Some("pooler"));
        assert_eq!(shared.client_max, 2);
        assert_eq!(config.default_route.unwrap().name, "fallback");
    }
}
