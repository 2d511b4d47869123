//! Value types flowing through a verification run.

use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::ToSchema;

use crate::error::VerifyError;

/// A GET endpoint template reported by the route source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RouteDescriptor {
    /// Path template, may contain `{name}` placeholders.
    pub path: String,
    /// HTTP method, always GET once filtered by the source.
    pub method: String,
    /// Opaque handler signature, informational only.
    pub signature: String,
}

impl RouteDescriptor {
    /// Create a GET descriptor with an empty signature.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: "GET".to_string(),
            signature: String::new(),
        }
    }
}

/// Caller-supplied request to verify one deployed build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest {
    /// Service (application) name known to the route source.
    #[serde(default)]
    pub service_name: String,
    /// Build being verified.
    #[serde(default)]
    pub build_number: String,
    /// Absolute base URL the routes are appended to.
    #[serde(default)]
    pub base_route_url: String,
    /// Target environment label.
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_environment() -> String {
    "qa".to_string()
}

impl VerificationRequest {
    /// Create a request for the default environment.
    pub fn new(
        service_name: impl Into<String>,
        build_number: impl Into<String>,
        base_route_url: impl Into<String>,
    ) -> Self {
        Self {
            service_name: service_name.into(),
            build_number: build_number.into(),
            base_route_url: base_route_url.into(),
            environment: default_environment(),
        }
    }

    /// Reject blank fields and a base URL that is not absolute.
    pub fn validate(&self) -> Result<(), VerifyError> {
        if self.service_name.trim().is_empty() {
            return Err(VerifyError::InvalidRequest(
                "Service name is required".to_string(),
            ));
        }
        if self.build_number.trim().is_empty() {
            return Err(VerifyError::InvalidRequest(
                "Build number is required".to_string(),
            ));
        }
        if self.base_route_url.trim().is_empty() {
            return Err(VerifyError::InvalidRequest(
                "Base route URL is required".to_string(),
            ));
        }
        match url::Url::parse(&self.base_route_url) {
            Ok(parsed) if parsed.has_host() => Ok(()),
            _ => Err(VerifyError::InvalidRequest(format!(
                "Base route URL must be absolute: {}",
                self.base_route_url
            ))),
        }
    }
}

/// Recorded result of probing one route exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteOutcome {
    /// Route path template as reported by the source.
    pub route: String,
    /// Base URL joined with the unsubstituted path.
    pub url: String,
    /// HTTP status, 0 when no response was received.
    pub status_code: u16,
    /// Human-readable status label.
    pub status_message: String,
    /// Wall-clock latency in milliseconds.
    pub response_time_ms: u64,
    /// Whether the status was 2xx.
    pub success: bool,
    /// Transport failure description.
    pub error_message: Option<String>,
}

impl RouteOutcome {
    /// Outcome for a request that received a response.
    pub fn completed(
        route: impl Into<String>,
        url: impl Into<String>,
        status_code: u16,
        response_time_ms: u64,
    ) -> Self {
        Self {
            route: route.into(),
            url: url.into(),
            status_code,
            status_message: status_message(status_code),
            response_time_ms,
            success: (200..300).contains(&status_code),
            error_message: None,
        }
    }

    /// Outcome for a request that never completed.
    pub fn failed(
        route: impl Into<String>,
        url: impl Into<String>,
        error: impl Into<String>,
        response_time_ms: u64,
    ) -> Self {
        Self {
            route: route.into(),
            url: url.into(),
            status_code: 0,
            status_message: "Error".to_string(),
            response_time_ms,
            success: false,
            error_message: Some(error.into()),
        }
    }
}

/// Map a status code to its display label.
pub fn status_message(status_code: u16) -> String {
    match status_code {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        other => return format!("HTTP {}", other),
    }
    .to_string()
}

/// Summary of a verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    /// Service that was verified.
    pub service_name: String,
    /// Build that was verified.
    pub build_number: String,
    /// Number of routes tested.
    pub total_routes: usize,
    /// Routes that answered 2xx.
    pub passed_routes: usize,
    /// Routes that did not.
    pub failed_routes: usize,
    /// Per-route outcomes.
    pub results: Vec<RouteOutcome>,
    /// Wall time of the whole run in milliseconds.
    pub total_duration_ms: u64,
}

impl VerificationReport {
    /// True when every tested route passed (vacuously true for zero routes).
    pub fn all_passed(&self) -> bool {
        self.failed_routes == 0
    }

    /// Outcomes that did not pass.
    pub fn failures(&self) -> impl Iterator<Item = &RouteOutcome> {
        self.results.iter().filter(|outcome| !outcome.success)
    }
}

/// Phases of a verification run. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RunPhase {
    /// Checking route source connectivity.
    Connecting,
    /// Fetching route descriptors.
    Retrieving,
    /// Probing routes.
    Testing,
    /// Report assembled.
    Done,
}
