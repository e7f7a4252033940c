//! Metrics collection and exposition.
//!
//! # Metrics
//! - `router_attach_total` (counter): attach results by status
//! - `router_routes_created_total` (counter): routes created by template
//! - `router_routes` (gauge): live routes
//! - `router_route_clients` (gauge): attached clients per route
//! - `router_pop_waiters` (gauge): parked pop callers per route
//! - `router_call_failures_total` (counter): facade-side failures by op, reason
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Per-route gauges are labelled with the resolved route identity

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::router::status::RouteStatus;
use crate::routing::route_id::RouteId;

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_attach(status: RouteStatus) {
    ::metrics::counter!("router_attach_total", "status" => status.as_str()).increment(1);
}

pub fn record_route_created(route: &str) {
    ::metrics::counter!("router_routes_created_total", "route" => route.to_string()).increment(1);
}

pub fn record_routes(count: usize) {
    ::metrics::gauge!("router_routes").set(count as f64);
}

pub fn record_route_clients(route: &RouteId, count: usize) {
    ::metrics::gauge!("router_route_clients", "route" => route.to_string()).set(count as f64);
}

pub fn record_pop_waiters(route: &RouteId, count: usize) {
    ::metrics::gauge!("router_pop_waiters", "route" => route.to_string()).set(count as f64);
}

pub fn record_call_failure(op: &'static str, reason: &'static str) {
    ::metrics::counter!("router_call_failures_total", "op" => op, "reason" => reason).increment(1);
}
