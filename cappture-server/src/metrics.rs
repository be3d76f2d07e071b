//! Prometheus metrics for cappture-server.
//!
//! Provides metrics collection and a Prometheus-compatible `/metrics` endpoint.

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

// Metric names as constants for consistency
const AGENT_REQUESTS_TOTAL: &str = "cappture_agent_requests_total";
const VALIDATION_FAILURES_TOTAL: &str = "cappture_validation_failures_total";

/// Initialize metrics and return the Prometheus handle.
///
/// # Errors
///
/// Returns an error if the Prometheus recorder cannot be installed
/// (e.g., if another recorder is already installed).
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

/// Record an answered agent request.
///
/// # Arguments
///
/// * `intent` - Classified intent (`create_file`, `help`, `chat`, ...)
pub fn record_agent_request(intent: &str) {
    counter!(
        AGENT_REQUESTS_TOTAL,
        "intent" => intent.to_string(),
        "outcome" => "ok"
    )
    .increment(1);
}

/// Record a rejected agent request.
///
/// # Arguments
///
/// * `reason` - Why it was rejected (`missing_message`, `invalid_body`)
pub fn record_validation_failure(reason: &str) {
    counter!(
        VALIDATION_FAILURES_TOTAL,
        "reason" => reason.to_string()
    )
    .increment(1);
}
