//! Shared utilities for router integration tests.

use std::net::SocketAddr;

use pooler_router::config::{PoolerConfig, RouteConfig};
use pooler_router::lifecycle::{self, RouterRuntime};
use pooler_router::routing::RouteSnapshot;
use pooler_router::{Client, RouterHandle, Server, StartupParams};

pub const BACKEND: &str = "127.0.0.1:5432";

/// A route template for `database` with the given admission limit.
pub fn route(name: &str, database: &str, client_max: usize) -> RouteConfig {
    let mut route = RouteConfig::new(name, database, BACKEND);
    route.client_max = client_max;
    route
}

/// Start a router over the given templates.
pub fn start(routes: Vec<RouteConfig>) -> RouterRuntime {
    start_with(routes, |_| {})
}

/// Start a router, letting the test tweak the config first.
pub fn start_with(routes: Vec<RouteConfig>, tweak: impl FnOnce(&mut PoolerConfig)) -> RouterRuntime {
    let mut config = PoolerConfig::default();
    config.routes = routes;
    tweak(&mut config);
    lifecycle::start(&config).expect("router should start")
}

pub fn client(database: &str, user: &str) -> Client {
    Client::new(StartupParams::new(database.to_string(), user.to_string()))
}

pub fn backend_server() -> Server {
    let addr: SocketAddr = BACKEND.parse().unwrap();
    Server::new(addr)
}

/// Poll snapshots until the first route satisfies `ready`.
pub async fn wait_for(router: &RouterHandle, ready: impl Fn(&RouteSnapshot) -> bool) {
    loop {
        let routes = router.snapshot().await.unwrap();
        if routes.first().is_some_and(&ready) {
            return;
        }
        tokio::task::yield_now().await;
    }
}
