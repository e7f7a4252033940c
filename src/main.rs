//! Pooler router daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   Session task (per client)                      Router actor (one task)
//!  ┌──────────────────────────┐                  ┌───────────────────────────┐
//!  │ startup params parsed    │   attach / pop   │ RouteRules (templates)    │
//!  │ RouterHandle::attach ────┼─────────────────▶│ RouteTable                │
//!  │ RouterHandle::pop    ◀───┼── reply ─────────│   Route: clients, servers │
//!  │ relay bytes              │                  │   FIFO pop waiters        │
//!  │ RouterHandle::push   ────┼── push/detach ──▶│                           │
//!  └──────────────────────────┘                  └───────────────────────────┘
//! ```
//!
//! The session handler and backend connection manager are external; this
//! binary runs the router core, validates configuration and can resolve a
//! (database, user) pair against a configuration for troubleshooting.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use pooler_router::config::loader::load_config;
use pooler_router::lifecycle::{self, signals};
use pooler_router::observability::{logging, metrics};
use pooler_router::{Client, StartupParams};

#[derive(Parser)]
#[command(name = "pooler-router")]
#[command(about = "Routing core of a database connection pooler", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "pooler.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the router until interrupted
    Run,
    /// Validate the configuration and print a summary
    Check,
    /// Resolve a (database, user) pair to a route
    Resolve {
        #[arg(long)]
        database: String,
        #[arg(long)]
        user: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Run => {
            logging::init_logging(&config.observability.log_level);
            tracing::info!("pooler-router v{} starting", env!("CARGO_PKG_VERSION"));

            if config.observability.metrics_enabled {
                if let Ok(addr) = config.observability.metrics_address.parse() {
                    metrics::init_metrics(addr);
                } else {
                    tracing::error!(
                        metrics_address = %config.observability.metrics_address,
                        "Failed to parse metrics address"
                    );
                }
            }

            let runtime = lifecycle::start(&config)?;
            signals::wait_for_shutdown().await;
            if let Some(table) = runtime.stop().await {
                tracing::info!(routes = table.len(), "Shutdown complete");
            }
        }
        Commands::Check => {
            let routes: Vec<_> = config
                .routes
                .iter()
                .chain(config.default_route.iter())
                .map(|r| {
                    json!({
                        "name": r.name,
                        "database": r.database,
                        "target": r.target,
                        "client_max": r.client_max,
                        "pool_size": r.pool_size,
                    })
                })
                .collect();
            let summary = json!({
                "valid": true,
                "routes": routes,
                "default_route": config.default_route.as_ref().map(|r| &r.name),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Resolve { database, user } => {
            let runtime = lifecycle::start(&config)?;
            let mut client = Client::new(StartupParams::new(database, user));
            let status = runtime.handle.attach(&mut client).await;

            let route = client.route().map(|r| {
                json!({
                    "name": r.config.name,
                    "id": r.id.to_string(),
                    "target": r.config.target,
                })
            });
            let result = json!({ "status": status.as_str(), "route": route });
            println!("{}", serde_json::to_string_pretty(&result)?);

            runtime.handle.detach(&mut client).await;
            runtime.stop().await;
        }
    }

    Ok(())
}
