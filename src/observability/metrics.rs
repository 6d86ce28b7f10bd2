//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_config_reloads_total` (counter): config loads by outcome
//! - `gateway_model_resolutions_total` (counter): resolve_model calls by outcome
//! - `gateway_config_models` (gauge): distinct routable model names in the live snapshot
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op
//! - Exporter is opt-in (`--metrics-address`)

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_reload(success: bool) {
    ::metrics::counter!("gateway_config_reloads_total", "outcome" => outcome(success)).increment(1);
}

pub fn record_resolution(success: bool) {
    ::metrics::counter!("gateway_model_resolutions_total", "outcome" => outcome(success)).increment(1);
}

pub fn set_model_count(count: usize) {
    ::metrics::gauge!("gateway_config_models").set(count as f64);
}

fn outcome(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}
