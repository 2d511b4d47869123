//! Mock route source and resolver for unit testing.
//!
//! These provide canned answers without making network requests and count
//! how often they were called.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::RouteSource;
use crate::resolver::BaseUrlResolver;
use crate::verify::RouteDescriptor;

/// Configuration for mock source behavior.
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Whether the connectivity check fails.
    pub fail_connection: bool,
    /// Simulated latency in milliseconds.
    pub latency_ms: u64,
}

/// Mock route source for testing.
#[derive(Debug, Clone, Default)]
pub struct MockRouteSource {
    /// Mock configuration.
    config: MockConfig,
    /// Routes returned for every service.
    routes: Arc<Mutex<Vec<RouteDescriptor>>>,
    /// Connectivity checks performed.
    connection_checks: Arc<AtomicUsize>,
    /// Route retrievals performed.
    retrievals: Arc<AtomicUsize>,
}

impl MockRouteSource {
    /// Create a connected mock with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock with custom configuration.
    pub fn with_config(config: MockConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Create a connected mock returning GET descriptors for `paths`.
    pub fn with_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let source = Self::new();
        source.set_routes(paths.into_iter().map(RouteDescriptor::get).collect());
        source
    }

    /// Create a mock whose connectivity check fails.
    pub fn disconnected() -> Self {
        Self::with_config(MockConfig {
            fail_connection: true,
            ..MockConfig::default()
        })
    }

    /// Replace the canned routes.
    pub fn set_routes(&self, routes: Vec<RouteDescriptor>) {
        *self.routes.lock().unwrap() = routes;
    }

    /// Number of connectivity checks performed.
    pub fn connection_checks(&self) -> usize {
        self.connection_checks.load(Ordering::SeqCst)
    }

    /// Number of route retrievals performed.
    pub fn retrievals(&self) -> usize {
        self.retrievals.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if self.config.latency_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.config.latency_ms)).await;
        }
    }
}

#[async_trait]
impl RouteSource for MockRouteSource {
    async fn test_connection(&self) -> bool {
        self.connection_checks.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        !self.config.fail_connection
    }

    async fn retrieve_routes(
        &self,
        _service_name: &str,
        _build_number: &str,
    ) -> Vec<RouteDescriptor> {
        self.retrievals.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        self.routes
            .lock()
            .unwrap()
            .iter()
            .filter(|route| route.method.eq_ignore_ascii_case("GET"))
            .cloned()
            .collect()
    }
}

/// Mock base URL resolver for testing.
#[derive(Debug, Clone, Default)]
pub struct MockBaseUrlResolver {
    /// Route URLs by service name.
    urls: Arc<Mutex<HashMap<String, String>>>,
    /// Whether the connectivity check fails.
    fail_connection: bool,
}

impl MockBaseUrlResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a resolver whose connectivity check fails.
    pub fn disconnected() -> Self {
        Self {
            fail_connection: true,
            ..Self::default()
        }
    }

    /// Register the base URL for a service.
    pub fn insert(&self, service_name: impl Into<String>, url: impl Into<String>) {
        self.urls
            .lock()
            .unwrap()
            .insert(service_name.into(), url.into());
    }
}

#[async_trait]
impl BaseUrlResolver for MockBaseUrlResolver {
    async fn route_url(&self, service_name: &str) -> Option<String> {
        self.urls.lock().unwrap().get(service_name).cloned()
    }

    async fn test_connection(&self) -> bool {
        !self.fail_connection
    }
}
