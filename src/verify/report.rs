//! Reduction of probe outcomes into a run report.

use super::types::{RouteOutcome, VerificationReport};

/// Build the report for a finished run.
///
/// `results` keep the order they were collected in.
pub fn aggregate(
    service_name: &str,
    build_number: &str,
    outcomes: Vec<RouteOutcome>,
    elapsed_ms: u64,
) -> VerificationReport {
    let total_routes = outcomes.len();
    let passed_routes = outcomes.iter().filter(|outcome| outcome.success).count();

    VerificationReport {
        service_name: service_name.to_string(),
        build_number: build_number.to_string(),
        total_routes,
        passed_routes,
        failed_routes: total_routes - passed_routes,
        results: outcomes,
        total_duration_ms: elapsed_ms,
    }
}
