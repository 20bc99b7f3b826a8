//! Metrics collection and exposition.
//!
//! # Metrics
//! - `page_router_requests_total` (counter): requests by outcome, status
//! - `page_router_request_duration_seconds` (histogram): latency distribution
//! - `page_router_compile_passes_total` (counter): compile passes by tree, result
//! - `page_router_routes` (gauge): routes per tree and kind
//! - `page_router_assets` (gauge): entries in the asset route table
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are static strings, never request paths

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

use crate::compiler::Tree;
use crate::routing::RouteTable;

/// How a request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Asset,
    NotModified,
    Passthrough,
    Render,
    ErrorRoute,
    Plain,
}

impl Outcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Asset => "asset",
            Outcome::NotModified => "not_modified",
            Outcome::Passthrough => "passthrough",
            Outcome::Render => "render",
            Outcome::ErrorRoute => "error_route",
            Outcome::Plain => "plain",
        }
    }
}

/// Install the Prometheus exporter with its own HTTP listener.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_request(outcome: Outcome, status: u16, start: Instant) {
    counter!(
        "page_router_requests_total",
        "outcome" => outcome.as_str(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("page_router_request_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_compile_pass(tree: Tree, ok: bool) {
    counter!(
        "page_router_compile_passes_total",
        "tree" => tree.as_str(),
        "result" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}

pub fn record_routes<E>(tree: Tree, table: &RouteTable<E>) {
    gauge!("page_router_routes", "tree" => tree.as_str(), "kind" => "static")
        .set(table.static_routes.len() as f64);
    gauge!("page_router_routes", "tree" => tree.as_str(), "kind" => "dynamic")
        .set(table.dynamic_routes.len() as f64);
    gauge!("page_router_routes", "tree" => tree.as_str(), "kind" => "error")
        .set(table.error_routes.len() as f64);
}

pub fn record_assets(count: usize) {
    gauge!("page_router_assets").set(count as f64);
}
