//! Metrics collection and exposition.
//!
//! # Metrics
//! - `ip2country_requests_total` (counter): lookups by outcome
//! - `ip2country_request_duration_seconds` (histogram): lookup latency
//! - `ip2country_rate_limited_total` (counter): admission rejections
//! - `ip2country_store_records` (gauge): records in the active snapshot
//! - `ip2country_store_reloads_total` (counter): reloads by result

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(outcome: &'static str, start: Instant) {
    ::metrics::counter!("ip2country_requests_total", "outcome" => outcome).increment(1);
    ::metrics::histogram!("ip2country_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_rate_limited() {
    ::metrics::counter!("ip2country_rate_limited_total").increment(1);
}

pub fn record_store_size(records: usize) {
    ::metrics::gauge!("ip2country_store_records").set(records as f64);
}

pub fn record_store_reload(success: bool) {
    let result = if success { "success" } else { "failure" };
    ::metrics::counter!("ip2country_store_reloads_total", "result" => result).increment(1);
}
