//! Single-route HTTP probe.

use std::error::Error as StdError;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::redirect::Policy;
use tracing::{debug, error, instrument, warn};

use super::substitute::substitute;
use super::types::{RouteDescriptor, RouteOutcome};
use crate::config::Config;
use crate::metrics::{self, InFlightGuard};

/// User agent sent with every probe. Some gateways reject non-browser agents.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Something that turns one descriptor into exactly one outcome.
///
/// Implementations must not panic or return early without an outcome;
/// every failure mode belongs in the returned [`RouteOutcome`].
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    /// Probe `descriptor` against `base_url`.
    async fn probe(&self, descriptor: &RouteDescriptor, base_url: &str) -> RouteOutcome;
}

/// Prober issuing real HTTP GETs over a shared client.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    /// Shared transport, cheap to clone.
    http: reqwest::Client,
    /// Per-request timeout.
    timeout: Duration,
}

impl HttpProbe {
    /// Create a probe over an existing client.
    pub fn new(http: reqwest::Client, timeout: Duration) -> Self {
        Self { http, timeout }
    }

    /// Create a probe with a client built from config.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?, config.route_timeout()))
    }

    /// Get the per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl Prober for HttpProbe {
    async fn probe(&self, descriptor: &RouteDescriptor, base_url: &str) -> RouteOutcome {
        probe_route(&self.http, descriptor, base_url, self.timeout).await
    }
}

/// Build the process-wide probe client.
///
/// Redirects are not followed, so a 3xx is reported as-is.
pub fn build_http_client(config: &Config) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
        .redirect(Policy::none())
        .tcp_nodelay(true)
        .pool_max_idle_per_host(config.max_concurrent)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
}

/// GET one route and record what happened.
///
/// Never fails: transport errors become an outcome with status 0.
#[instrument(skip(http, descriptor), fields(route = %descriptor.path))]
pub async fn probe_route(
    http: &reqwest::Client,
    descriptor: &RouteDescriptor,
    base_url: &str,
    timeout: Duration,
) -> RouteOutcome {
    let full_url = format!("{}{}", base_url, descriptor.path);
    let request_url = substitute(&full_url);

    debug!(url = %request_url, "Testing route");

    let _in_flight = InFlightGuard::enter();
    let start = Instant::now();
    let result = send(http, &request_url, timeout).await;
    let elapsed_ms = start.elapsed().as_millis() as u64;

    let outcome = match result {
        Ok(status) => {
            let outcome =
                RouteOutcome::completed(&descriptor.path, full_url, status, elapsed_ms);
            if outcome.success {
                debug!(status, elapsed_ms, "Route test passed");
            } else {
                warn!(status, elapsed_ms, "Route test failed");
            }
            outcome
        }
        Err(e) => {
            let message = describe_error(&e, timeout);
            error!(error = %message, elapsed_ms, "Error testing route");
            RouteOutcome::failed(&descriptor.path, full_url, message, elapsed_ms)
        }
    };

    metrics::record_probe(outcome.response_time_ms, outcome.success);
    outcome
}

/// Issue the request and drain the body, returning the status code.
async fn send(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<u16, reqwest::Error> {
    let response = http
        .get(url)
        .header(ACCEPT, "application/json")
        .header(USER_AGENT, BROWSER_USER_AGENT)
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status().as_u16();
    // A body that cannot be read counts as a malformed response.
    response.bytes().await?;

    Ok(status)
}

fn describe_error(e: &reqwest::Error, timeout: Duration) -> String {
    if e.is_timeout() {
        format!("request timed out after {} ms", timeout.as_millis())
    } else if e.is_builder() {
        format!("invalid request: {}", error_chain(e))
    } else if e.is_connect() {
        format!("connection failed: {}", error_chain(e))
    } else {
        error_chain(e)
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(e: &dyn StdError) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
