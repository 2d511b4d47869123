//! Unified error types for the route monitor.

use thiserror::Error;

/// Unified error type for the route monitor.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Verification run error.
    #[error("verification error: {0}")]
    Verification(#[from] VerifyError),

    /// Route source error.
    #[error("route source error: {0}")]
    Source(#[from] SourceError),

    /// Base URL resolver error.
    #[error("resolver error: {0}")]
    Resolver(#[from] ResolverError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Run-level failures surfaced by the verification orchestrator.
///
/// Per-route failures never show up here; they are recorded in the
/// outcome of the route that failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The request failed boundary validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The route source could not be reached, so no route was tested.
    #[error("route source unavailable: {0}")]
    UpstreamUnavailable(String),
}

/// Contrast route source errors.
///
/// These are absorbed by the client's trait implementation and only
/// surface through logs.
#[derive(Error, Debug)]
pub enum SourceError {
    /// No application matches the requested service name.
    #[error("application not found for service {service}")]
    ApplicationNotFound {
        /// The service name that was looked up.
        service: String,
    },

    /// The API answered with a non-200 status.
    #[error("unexpected status {status} from {endpoint}: {body}")]
    UnexpectedStatus {
        /// Endpoint that was called.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// Failed to parse the API response.
    #[error("failed to parse response: {0}")]
    ParseError(String),

    /// HTTP request failed.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// OpenShift base URL resolver errors.
#[derive(Error, Debug)]
pub enum ResolverError {
    /// The route does not exist in the namespace.
    #[error("route {name} not found in namespace {namespace}")]
    RouteNotFound {
        /// Route name.
        name: String,
        /// Namespace searched.
        namespace: String,
    },

    /// The route exists but carries no host.
    #[error("route {name} has no host")]
    MissingHost {
        /// Route name.
        name: String,
    },

    /// The API answered with an unexpected status.
    #[error("unexpected status {status} for route {name}")]
    UnexpectedStatus {
        /// Route name.
        name: String,
        /// HTTP status code.
        status: u16,
    },

    /// HTTP request failed.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, MonitorError>;
