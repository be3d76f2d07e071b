//! Health check endpoints for Kubernetes probes.
//!
//! - `/health/live` - Liveness probe (restart if fails)
//! - `/health/ready` - Readiness probe, with build and agent details
//! - `/health` - Same as `/health/ready`
//!
//! The agent replies from in-process keyword rules, so once the listener is
//! up the service is ready.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::AppState;

/// Readiness response body.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Always "healthy" when served.
    pub status: &'static str,
    /// Server version
    pub version: &'static str,
    /// Seconds since the server started
    pub uptime_secs: u64,
    /// Simulated reply delay in milliseconds
    pub response_delay_ms: u64,
}

/// Liveness probe - is the server running?
///
/// Returns 200 OK if the process is alive.
#[tracing::instrument(name = "liveness_probe")]
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe with uptime and the configured reply delay.
#[tracing::instrument(name = "readiness_probe", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        response_delay_ms: u64::try_from(state.agent.delay().as_millis()).unwrap_or(u64::MAX),
    })
}
