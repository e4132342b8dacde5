//! Metrics collection and exposition.
//!
//! # Metrics
//! - `spec_check_fetch_total` (counter): node requests by endpoint, outcome
//! - `spec_check_fetch_retries_total` (counter): retries by endpoint
//! - `spec_check_fetch_duration_seconds` (histogram): per-attempt latency
//! - `spec_check_blocks_scanned_total` (counter): blocks read by account discovery
//! - `spec_check_requirements_total` (counter): requirement outcomes by api, status

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder. The handle renders the text snapshot.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record one attempt against a node endpoint.
pub fn record_fetch(endpoint: &'static str, success: bool, elapsed: Duration) {
    let outcome = if success { "success" } else { "error" };
    metrics::counter!("spec_check_fetch_total", "endpoint" => endpoint, "outcome" => outcome)
        .increment(1);
    metrics::histogram!("spec_check_fetch_duration_seconds", "endpoint" => endpoint)
        .record(elapsed.as_secs_f64());
}

pub fn record_retry(endpoint: &'static str) {
    metrics::counter!("spec_check_fetch_retries_total", "endpoint" => endpoint).increment(1);
}

pub fn record_block_scanned() {
    metrics::counter!("spec_check_blocks_scanned_total").increment(1);
}

pub fn record_requirement(api: &'static str, requirement: &'static str, passed: bool) {
    let status = if passed { "success" } else { "failure" };
    metrics::counter!(
        "spec_check_requirements_total",
        "api" => api,
        "requirement" => requirement,
        "status" => status
    )
    .increment(1);
}
