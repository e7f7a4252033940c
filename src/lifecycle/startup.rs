//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate configuration
//! - Initialize the router (route table, inbound queue)
//! - Start the actor and hand back a caller handle
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The actor starts last, after everything it needs exists

use tokio::task::JoinHandle;

use crate::config::validation::{describe_errors, validate_config, ValidationError};
use crate::config::PoolerConfig;
use crate::lifecycle::shutdown::Shutdown;
use crate::router::{Router, RouterHandle, RouterInitError};
use crate::routing::table::RouteTable;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid configuration: {}", describe_errors(.0))]
    Config(Vec<ValidationError>),
    #[error(transparent)]
    Router(#[from] RouterInitError),
}

/// A running router: its caller handle, shutdown coordinator and task.
pub struct RouterRuntime {
    pub handle: RouterHandle,
    pub shutdown: Shutdown,
    task: JoinHandle<RouteTable>,
}

impl RouterRuntime {
    /// Signal shutdown and wait for the actor to finish its current message.
    pub async fn stop(self) -> Option<RouteTable> {
        self.shutdown.trigger();
        match self.task.await {
            Ok(table) => Some(table),
            Err(e) => {
                tracing::error!(error = %e, "Router task failed");
                None
            }
        }
    }
}

/// Validate, initialize and start the router.
pub fn start(config: &PoolerConfig) -> Result<RouterRuntime, StartupError> {
    validate_config(config).map_err(StartupError::Config)?;

    let router = Router::init(config)?;
    let handle = router.handle();
    let shutdown = Shutdown::new();
    let task = router.start(shutdown.subscribe());

    Ok(RouterRuntime {
        handle,
        shutdown,
        task,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RouteConfig;

    #[tokio::test]
    async fn test_invalid_config_fails_fast() {
        let mut config = PoolerConfig::default();
        config.routes.push(RouteConfig::new("bad", "a*b", "127.0.0.1:5432"));

        let err = start(&config).err().unwrap();
        assert!(matches!(err, StartupError::Config(_)));
        assert!(err.to_string().contains("routes[0].database"));
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let mut config = PoolerConfig::default();
        config.routes.push(RouteConfig::new("app", "app_db", "127.0.0.1:5432"));

        let runtime = start(&config).unwrap();
        assert!(runtime.handle.snapshot().await.unwrap().is_empty());

        let table = runtime.stop().await.unwrap();
        assert!(table.is_empty());
    }
}
