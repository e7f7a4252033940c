//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router actor and facade produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`route`, `client_id`, `status`) on every event
//! - Facade failures carry `origin = "facade"` to separate them from
//!   statuses the actor produced
//! - Metrics are cheap (atomic updates behind the `metrics` facade)

pub mod logging;
pub mod metrics;
