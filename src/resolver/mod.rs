//! Base URL resolution for deployed services.

pub mod openshift;

use async_trait::async_trait;

pub use openshift::OpenShiftClient;

/// Supplier of the public base URL for a service.
#[async_trait]
pub trait BaseUrlResolver: Send + Sync {
    /// Base URL (scheme and host, no trailing slash) for `service_name`.
    async fn route_url(&self, service_name: &str) -> Option<String>;

    /// Check connectivity and credentials.
    async fn test_connection(&self) -> bool;
}
