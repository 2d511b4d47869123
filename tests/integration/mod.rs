//! End-to-end verification runs against fake Contrast and target servers.
//!
//! Both the route source and the service under test are `httpmock` servers,
//! so these run offline.

use std::collections::HashSet;
use std::sync::Arc;

use httpmock::prelude::*;
use httpmock::Mock;
use pretty_assertions::assert_eq;
use serde_json::json;

use route_monitor::config::Config;
use route_monitor::source::{ContrastClient, RouteSource};
use route_monitor::verify::{VerificationOrchestrator, VerificationRequest};
use route_monitor::VerifyError;

fn config_for(contrast: &MockServer) -> Config {
    Config {
        contrast_api_url: contrast.base_url(),
        contrast_api_key: "api-key".to_string(),
        contrast_username: "svc-user".to_string(),
        contrast_service_key: "svc-key".to_string(),
        contrast_organization_id: "org-1".to_string(),
        contrast_timeout_ms: 2_000,
        route_timeout_ms: 2_000,
        max_concurrent: 2,
        retry_attempts: 0,
        ..Config::default()
    }
}

fn orchestrator(config: &Config) -> VerificationOrchestrator {
    let source: Arc<dyn RouteSource> = Arc::new(ContrastClient::new(config).unwrap());
    VerificationOrchestrator::from_config(config, source).unwrap()
}

/// Register the applications listing with one `orders` application.
async fn mock_applications(contrast: &MockServer) -> Mock<'_> {
    contrast
        .mock_async(|when, then| {
            when.method(GET).path("/ng/org-1/applications");
            then.status(200).json_body(json!({
                "applications": [{ "name": "orders", "app_id": "app-7" }]
            }));
        })
        .await
}

/// Register the routes listing for `orders`.
async fn mock_routes(contrast: &MockServer, routes: serde_json::Value) -> Mock<'_> {
    contrast
        .mock_async(move |when, then| {
            when.method(GET).path("/ng/org-1/traces/app-7/routes");
            then.status(200).json_body(json!({ "routes": routes }));
        })
        .await
}

#[tokio::test(flavor = "multi_thread")]
async fn verifies_mixed_routes_end_to_end() {
    let contrast = MockServer::start_async().await;
    let target = MockServer::start_async().await;

    mock_applications(&contrast).await;
    mock_routes(
        &contrast,
        json!([
            { "route": "/a", "verb": "GET" },
            { "route": "/b/{id}", "verb": "GET" },
            { "route": "/c", "verb": "GET" },
            { "route": "/a", "verb": "DELETE" }
        ]),
    )
    .await;

    let a = target
        .mock_async(|when, then| {
            when.method(GET).path("/a");
            then.status(200);
        })
        .await;
    let b = target
        .mock_async(|when, then| {
            when.method(GET).path("/b/1");
            then.status(200);
        })
        .await;
    let c = target
        .mock_async(|when, then| {
            when.method(GET).path("/c");
            then.status(500);
        })
        .await;

    let config = config_for(&contrast);
    let request = VerificationRequest::new("orders", "build-12", target.base_url());
    let report = orchestrator(&config).execute(&request).await.unwrap();

    assert_eq!(report.total_routes, 3);
    assert_eq!(report.passed_routes, 2);
    assert_eq!(report.failed_routes, 1);
    assert_eq!(report.results.len(), 3);

    let routes: HashSet<&str> = report.results.iter().map(|o| o.route.as_str()).collect();
    assert_eq!(routes, HashSet::from(["/a", "/b/{id}", "/c"]));

    let failed: Vec<_> = report.failures().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].route, "/c");
    assert_eq!(failed[0].status_code, 500);
    assert_eq!(failed[0].status_message, "Internal Server Error");

    a.assert_hits_async(1).await;
    b.assert_hits_async(1).await;
    c.assert_hits_async(1).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_contrast_aborts_without_probing() {
    let contrast = MockServer::start_async().await;
    let target = MockServer::start_async().await;

    contrast
        .mock_async(|when, then| {
            when.method(GET).path("/ng/org-1/applications");
            then.status(503);
        })
        .await;
    let any_probe = target
        .mock_async(|when, then| {
            when.any_request();
            then.status(200);
        })
        .await;

    let config = config_for(&contrast);
    let request = VerificationRequest::new("orders", "build-12", target.base_url());
    let err = orchestrator(&config).execute(&request).await.unwrap_err();

    assert!(matches!(err, VerifyError::UpstreamUnavailable(_)));
    assert_eq!(any_probe.hits_async().await, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn no_routes_yields_zero_report() {
    let contrast = MockServer::start_async().await;
    let target = MockServer::start_async().await;

    mock_applications(&contrast).await;
    mock_routes(&contrast, json!([])).await;

    let config = config_for(&contrast);
    let request = VerificationRequest::new("orders", "build-12", target.base_url());
    let report = orchestrator(&config).execute(&request).await.unwrap();

    assert_eq!(report.total_routes, 0);
    assert_eq!(report.passed_routes, 0);
    assert_eq!(report.failed_routes, 0);
    assert!(report.results.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_service_is_an_empty_run_not_an_error() {
    let contrast = MockServer::start_async().await;
    let target = MockServer::start_async().await;

    mock_applications(&contrast).await;

    let config = config_for(&contrast);
    let request = VerificationRequest::new("billing", "build-3", target.base_url());
    let report = orchestrator(&config).execute(&request).await.unwrap();

    assert_eq!(report.total_routes, 0);
    assert!(report.all_passed());
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_route_times_out_without_affecting_others() {
    let contrast = MockServer::start_async().await;
    let target = MockServer::start_async().await;

    mock_applications(&contrast).await;
    mock_routes(
        &contrast,
        json!([{ "route": "/fast" }, { "route": "/slow" }, { "route": "/users/{userId}" }]),
    )
    .await;

    target
        .mock_async(|when, then| {
            when.method(GET).path("/fast");
            then.status(200);
        })
        .await;
    target
        .mock_async(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(std::time::Duration::from_millis(1_500));
        })
        .await;
    target
        .mock_async(|when, then| {
            when.method(GET).path("/users/1");
            then.status(204);
        })
        .await;

    let config = Config {
        route_timeout_ms: 200,
        stable_result_order: true,
        ..config_for(&contrast)
    };
    let request = VerificationRequest::new("orders", "build-12", target.base_url());
    let report = orchestrator(&config).execute(&request).await.unwrap();

    assert_eq!(report.total_routes, 3);
    assert_eq!(report.passed_routes, 2);

    let routes: Vec<_> = report.results.iter().map(|o| o.route.as_str()).collect();
    assert_eq!(routes, vec!["/fast", "/slow", "/users/{userId}"]);

    let slow = &report.results[1];
    assert_eq!(slow.status_code, 0);
    assert_eq!(slow.status_message, "Error");
    assert!(slow.error_message.as_deref().is_some_and(|m| !m.is_empty()));
    assert_eq!(slow.url, format!("{}/slow", target.base_url()));
}
