//! Entry point for a verification run.
//!
//! A run moves through [`RunPhase::Connecting`], [`RunPhase::Retrieving`],
//! [`RunPhase::Testing`] and [`RunPhase::Done`] strictly in that order. Only a
//! failed connectivity check stops it early.

use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info, instrument, warn};

use super::probe::{HttpProbe, Prober};
use super::report::aggregate;
use super::runner::ConcurrentRunner;
use super::types::{RunPhase, VerificationReport, VerificationRequest};
use crate::config::Config;
use crate::error::VerifyError;
use crate::metrics;
use crate::source::RouteSource;

/// Runs the connect, retrieve, test sequence for one request at a time.
pub struct VerificationOrchestrator<P = HttpProbe> {
    source: Arc<dyn RouteSource>,
    runner: ConcurrentRunner<P>,
}

impl<P> Clone for VerificationOrchestrator<P> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
            runner: self.runner.clone(),
        }
    }
}

impl VerificationOrchestrator<HttpProbe> {
    /// Build an orchestrator probing over HTTP with settings from config.
    pub fn from_config(
        config: &Config,
        source: Arc<dyn RouteSource>,
    ) -> Result<Self, reqwest::Error> {
        if config.retry_attempts > 0 {
            warn!(
                retry_attempts = config.retry_attempts,
                "RETRY_ATTEMPTS is set but failed routes are not retried"
            );
        }

        let probe = HttpProbe::from_config(config)?;
        let runner = ConcurrentRunner::new(Arc::new(probe), config.max_concurrent)
            .with_stable_order(config.stable_result_order);

        Ok(Self::new(source, runner))
    }
}

impl<P: Prober> VerificationOrchestrator<P> {
    /// Create an orchestrator over an existing runner.
    pub fn new(source: Arc<dyn RouteSource>, runner: ConcurrentRunner<P>) -> Self {
        Self { source, runner }
    }

    /// Verify every GET route of the requested build.
    ///
    /// Returns a complete report, possibly with failed routes, or a run-level
    /// error when the request is invalid or the route source is unreachable.
    #[instrument(
        skip(self, request),
        fields(service = %request.service_name, build = %request.build_number)
    )]
    pub async fn execute(
        &self,
        request: &VerificationRequest,
    ) -> Result<VerificationReport, VerifyError> {
        request.validate()?;

        let start = Instant::now();
        metrics::inc_runs_started();
        info!(environment = %request.environment, "Starting route verification");

        let mut phase = RunPhase::Connecting;
        info!(%phase, "Establishing connection to route source");
        if !self.source.test_connection().await {
            metrics::inc_runs_upstream_failed();
            error!(%phase, "Route source unreachable, aborting run");
            return Err(VerifyError::UpstreamUnavailable(
                "failed to connect to route source".to_string(),
            ));
        }

        phase = RunPhase::Retrieving;
        info!(%phase, "Retrieving routes");
        let routes = self
            .source
            .retrieve_routes(&request.service_name, &request.build_number)
            .await;
        if routes.is_empty() {
            warn!(%phase, "No routes found");
        } else {
            info!(%phase, count = routes.len(), "Retrieved routes");
        }

        phase = RunPhase::Testing;
        info!(
            %phase,
            count = routes.len(),
            base_url = %request.base_route_url,
            max_concurrent = self.runner.max_concurrent(),
            "Testing endpoints"
        );
        let outcomes = self.runner.run(&routes, &request.base_route_url).await;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        metrics::record_run_duration(start);

        phase = RunPhase::Done;
        let report = aggregate(
            &request.service_name,
            &request.build_number,
            outcomes,
            elapsed_ms,
        );
        info!(
            %phase,
            total = report.total_routes,
            passed = report.passed_routes,
            failed = report.failed_routes,
            duration_ms = report.total_duration_ms,
            "Route verification finished"
        );

        Ok(report)
    }
}
