//! Prometheus metrics for verification runs and route probes.
//!
//! This module provides metrics for:
//! - Route probe latency
//! - Probe pass/fail counts
//! - Probes currently in flight
//! - Verification runs and fatal upstream failures

use std::time::Instant;

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Route probe latency metric name.
pub const METRIC_PROBE_LATENCY: &str = "route_probe_latency_ms";
/// Whole-run duration metric name.
pub const METRIC_RUN_DURATION: &str = "verification_run_duration_ms";
/// Passed probes counter metric name.
pub const METRIC_PROBES_PASSED: &str = "route_probes_passed_total";
/// Failed probes counter metric name.
pub const METRIC_PROBES_FAILED: &str = "route_probes_failed_total";
/// Probes in flight gauge metric name.
pub const METRIC_PROBES_IN_FLIGHT: &str = "route_probes_in_flight";
/// Runs started counter metric name.
pub const METRIC_RUNS_STARTED: &str = "verification_runs_started_total";
/// Runs aborted by an unreachable route source.
pub const METRIC_RUNS_UPSTREAM_FAILED: &str = "verification_runs_upstream_failed_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_PROBE_LATENCY,
        "Route probe latency in milliseconds"
    );
    describe_histogram!(
        METRIC_RUN_DURATION,
        "Verification run wall time in milliseconds"
    );

    describe_counter!(METRIC_PROBES_PASSED, "Total number of probes answering 2xx");
    describe_counter!(
        METRIC_PROBES_FAILED,
        "Total number of probes that failed or answered non-2xx"
    );
    describe_counter!(METRIC_RUNS_STARTED, "Total number of verification runs");
    describe_counter!(
        METRIC_RUNS_UPSTREAM_FAILED,
        "Total number of runs aborted because the route source was unreachable"
    );

    describe_gauge!(METRIC_PROBES_IN_FLIGHT, "Route probes currently in flight");

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return its render handle.
pub fn install_prometheus() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Record the outcome of one probe.
pub fn record_probe(latency_ms: u64, success: bool) {
    histogram!(METRIC_PROBE_LATENCY).record(latency_ms as f64);
    if success {
        counter!(METRIC_PROBES_PASSED).increment(1);
    } else {
        counter!(METRIC_PROBES_FAILED).increment(1);
    }
}

/// Record run duration.
pub fn record_run_duration(start: Instant) {
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_RUN_DURATION).record(duration_ms);
}

/// Increment runs started counter.
pub fn inc_runs_started() {
    counter!(METRIC_RUNS_STARTED).increment(1);
}

/// Increment upstream failure counter.
pub fn inc_runs_upstream_failed() {
    counter!(METRIC_RUNS_UPSTREAM_FAILED).increment(1);
}

/// RAII guard tracking one probe in flight.
/// Decrements the gauge when dropped, including on panic.
pub struct InFlightGuard {
    _private: (),
}

impl InFlightGuard {
    /// Mark a probe as started.
    pub fn enter() -> Self {
        gauge!(METRIC_PROBES_IN_FLIGHT).increment(1.0);
        Self { _private: () }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        gauge!(METRIC_PROBES_IN_FLIGHT).decrement(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_without_recorder_is_noop() {
        record_probe(12, true);
        record_probe(40, false);
        inc_runs_started();
        let _guard = InFlightGuard::enter();
    }
}
