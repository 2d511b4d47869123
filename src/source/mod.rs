//! Route sources: where the list of endpoints to verify comes from.
//!
//! This module handles:
//! - The `RouteSource` seam used by the orchestrator
//! - Contrast Security client
//! - Mock source for testing

pub mod contrast;
pub mod mock;

use async_trait::async_trait;

use crate::verify::RouteDescriptor;

pub use contrast::ContrastClient;
pub use mock::MockRouteSource;

/// Supplier of route descriptors for a service build.
///
/// Implementations absorb their own errors: a failed lookup is logged and
/// reported as `false` or an empty list, never propagated.
#[async_trait]
pub trait RouteSource: Send + Sync {
    /// Check connectivity and credentials.
    async fn test_connection(&self) -> bool;

    /// Fetch the GET routes recorded for `service_name` at `build_number`.
    async fn retrieve_routes(&self, service_name: &str, build_number: &str)
        -> Vec<RouteDescriptor>;
}
