//! HTTP API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::doc::ApiDoc;
use super::handlers::{
    contrast_test_connection, health, metrics, openshift_route, run_tests, AppState,
};

// Route path constants - single source of truth for all API paths

pub const TEST: &str = "/api/test";
pub const CONTRAST_TEST_CONNECTION: &str = "/api/contrast/test-connection";
pub const OPENSHIFT_ROUTE: &str = "/api/openshift/route";
pub const HEALTH: &str = "/api/health";
pub const METRICS: &str = "/metrics";

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(TEST, post(run_tests))
        .route(CONTRAST_TEST_CONNECTION, get(contrast_test_connection))
        .route(OPENSHIFT_ROUTE, get(openshift_route))
        .route(HEALTH, get(health))
        .route(METRICS, get(metrics))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
