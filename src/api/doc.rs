//! OpenAPI documentation.

use utoipa::OpenApi;

use super::handlers::{
    self, ConnectionResponse, ErrorResponse, HealthResponse, RouteUrlResponse,
};
use crate::verify::{RouteDescriptor, RouteOutcome, VerificationReport, VerificationRequest};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "route-monitor API",
        version = "0.1.0",
        description = "Post-deployment verification of a service's GET routes"
    ),
    paths(
        handlers::run_tests,
        handlers::contrast_test_connection,
        handlers::openshift_route,
        handlers::health
    ),
    components(
        schemas(
            VerificationRequest,
            VerificationReport,
            RouteOutcome,
            RouteDescriptor,
            ConnectionResponse,
            RouteUrlResponse,
            HealthResponse,
            ErrorResponse
        )
    ),
    tags(
        (name = "verification", description = "Route verification runs"),
        (name = "collaborators", description = "Route source and resolver checks"),
        (name = "health", description = "Health check operations")
    )
)]
pub struct ApiDoc;
