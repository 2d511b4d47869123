//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use super::routes;
use crate::error::VerifyError;
use crate::resolver::BaseUrlResolver;
use crate::source::RouteSource;
use crate::verify::{VerificationOrchestrator, VerificationReport, VerificationRequest};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Runs verification requests.
    pub orchestrator: Arc<VerificationOrchestrator>,
    /// Route source, for the connectivity endpoint.
    pub source: Arc<dyn RouteSource>,
    /// Base URL resolver, absent when OpenShift is not configured.
    pub resolver: Option<Arc<dyn BaseUrlResolver>>,
    /// Prometheus render handle, absent when metrics are disabled.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        orchestrator: VerificationOrchestrator,
        source: Arc<dyn RouteSource>,
        resolver: Option<Arc<dyn BaseUrlResolver>>,
    ) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            source,
            resolver,
            metrics: None,
        }
    }

    /// Attach the Prometheus handle.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Error body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// What went wrong.
    pub error: String,
}

/// Errors returned by API endpoints.
#[derive(Debug)]
pub enum ApiError {
    /// Request failed validation.
    InvalidRequest(String),
    /// Route source unreachable.
    UpstreamUnavailable(String),
}

impl From<VerifyError> for ApiError {
    fn from(err: VerifyError) -> Self {
        match err {
            VerifyError::InvalidRequest(msg) => ApiError::InvalidRequest(msg),
            VerifyError::UpstreamUnavailable(msg) => ApiError::UpstreamUnavailable(msg),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::UpstreamUnavailable(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        (status, Json(ErrorResponse { error })).into_response()
    }
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "UP".
    pub status: String,
    /// Service name.
    pub service: String,
}

/// Route source connectivity response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ConnectionResponse {
    /// Whether the route source answered.
    pub connected: bool,
    /// Human-readable result.
    pub message: String,
}

/// Base URL lookup query.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RouteQuery {
    /// Service to resolve.
    pub service_name: Option<String>,
}

/// Base URL lookup response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RouteUrlResponse {
    /// Whether a URL was found.
    pub success: bool,
    /// Resolved base URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_url: Option<String>,
    /// Service that was resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    /// Reason when no URL was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Run a verification and return its report.
#[utoipa::path(
    post,
    path = routes::TEST,
    request_body = VerificationRequest,
    responses(
        (status = 200, description = "Verification finished", body = VerificationReport),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 502, description = "Route source unavailable", body = ErrorResponse)
    ),
    tag = "verification"
)]
pub async fn run_tests(
    State(state): State<AppState>,
    payload: Result<Json<VerificationRequest>, JsonRejection>,
) -> Result<Json<VerificationReport>, ApiError> {
    let Json(request) = payload?;
    info!(
        service = %request.service_name,
        build = %request.build_number,
        "Received test request"
    );

    let report = state.orchestrator.execute(&request).await.map_err(|e| {
        error!(error = %e, "Route verification failed");
        ApiError::from(e)
    })?;

    Ok(Json(report))
}

/// Check route source connectivity.
#[utoipa::path(
    get,
    path = routes::CONTRAST_TEST_CONNECTION,
    responses((status = 200, description = "Connectivity result", body = ConnectionResponse)),
    tag = "collaborators"
)]
pub async fn contrast_test_connection(State(state): State<AppState>) -> Json<ConnectionResponse> {
    let connected = state.source.test_connection().await;
    let message = if connected {
        "Successfully connected to Contrast Security"
    } else {
        "Failed to connect to Contrast Security"
    };

    Json(ConnectionResponse {
        connected,
        message: message.to_string(),
    })
}

/// Resolve the base URL for a service.
#[utoipa::path(
    get,
    path = routes::OPENSHIFT_ROUTE,
    params(RouteQuery),
    responses(
        (status = 200, description = "Lookup result", body = RouteUrlResponse),
        (status = 400, description = "Missing serviceName", body = ErrorResponse)
    ),
    tag = "collaborators"
)]
pub async fn openshift_route(
    State(state): State<AppState>,
    Query(query): Query<RouteQuery>,
) -> Result<Json<RouteUrlResponse>, ApiError> {
    let service_name = query
        .service_name
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| ApiError::InvalidRequest("serviceName is required".to_string()))?;

    let Some(resolver) = &state.resolver else {
        return Ok(Json(RouteUrlResponse {
            success: false,
            route_url: None,
            service_name: None,
            message: Some("OpenShift is not configured".to_string()),
        }));
    };

    let response = match resolver.route_url(&service_name).await {
        Some(url) => RouteUrlResponse {
            success: true,
            route_url: Some(url),
            service_name: Some(service_name),
            message: None,
        },
        None => RouteUrlResponse {
            success: false,
            route_url: None,
            service_name: None,
            message: Some(format!("Route not found for service: {}", service_name)),
        },
    };

    Ok(Json(response))
}

/// Health check handler - always returns 200.
#[utoipa::path(
    get,
    path = routes::HEALTH,
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "health"
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        service: "Route Monitor".to_string(),
    })
}

/// Prometheus metrics in text format.
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
