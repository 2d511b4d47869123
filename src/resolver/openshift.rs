//! OpenShift routes API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use super::BaseUrlResolver;
use crate::config::Config;
use crate::error::ResolverError;

/// Resolves service base URLs from OpenShift `Route` objects.
#[derive(Debug, Clone)]
pub struct OpenShiftClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// API server URL.
    api_url: String,
    /// Bearer token.
    token: String,
    /// Namespace holding the routes.
    namespace: String,
}

/// Subset of the `route.openshift.io/v1` Route object.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteObject {
    /// Route spec.
    pub spec: Option<RouteSpec>,
}

/// Route spec fields used for URL construction.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteSpec {
    /// Public host name.
    pub host: Option<String>,
    /// TLS settings, present when the route terminates TLS.
    pub tls: Option<serde_json::Value>,
}

impl OpenShiftClient {
    /// Create a client from config, or `None` when OpenShift is not configured.
    ///
    /// Cluster certificates are trusted without verification.
    pub fn from_config(config: &Config) -> Option<Result<Self, reqwest::Error>> {
        let (api_url, token, namespace) = match (
            &config.openshift_api_url,
            &config.openshift_token,
            &config.openshift_namespace,
        ) {
            (Some(api_url), Some(token), Some(namespace)) => (api_url, token, namespace),
            _ => return None,
        };

        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(config.openshift_timeout())
            .build();

        Some(http.map(|http| Self::with_client(http, api_url, token, namespace)))
    }

    /// Create a client reusing an existing HTTP client.
    pub fn with_client(
        http: reqwest::Client,
        api_url: impl Into<String>,
        token: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            namespace: namespace.into(),
        }
    }

    /// Get the namespace.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn route_object_url(&self, name: &str) -> String {
        format!(
            "{}/apis/route.openshift.io/v1/namespaces/{}/routes/{}",
            self.api_url, self.namespace, name
        )
    }

    /// Fetch the route named after the service and build its URL.
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    pub async fn fetch_route_url(&self, service_name: &str) -> Result<String, ResolverError> {
        let response = self
            .http
            .get(self.route_object_url(service_name))
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolverError::RouteNotFound {
                name: service_name.to_string(),
                namespace: self.namespace.clone(),
            });
        }
        if !response.status().is_success() {
            return Err(ResolverError::UnexpectedStatus {
                name: service_name.to_string(),
                status: response.status().as_u16(),
            });
        }

        let route: RouteObject = response.json().await?;
        route_url_from(&route).ok_or_else(|| ResolverError::MissingHost {
            name: service_name.to_string(),
        })
    }

    /// List namespaces to confirm the token is accepted.
    #[instrument(skip(self))]
    pub async fn check_connection(&self) -> Result<(), ResolverError> {
        let response = self
            .http
            .get(format!("{}/api/v1/namespaces", self.api_url))
            .bearer_auth(&self.token)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ResolverError::UnexpectedStatus {
                name: "namespaces".to_string(),
                status: response.status().as_u16(),
            })
        }
    }
}

/// `https://host` when TLS is configured, `http://host` otherwise.
fn route_url_from(route: &RouteObject) -> Option<String> {
    let spec = route.spec.as_ref()?;
    let host = spec.host.as_deref().filter(|host| !host.is_empty())?;
    let scheme = if spec.tls.as_ref().is_some_and(|tls| !tls.is_null()) {
        "https"
    } else {
        "http"
    };
    Some(format!("{}://{}", scheme, host))
}

#[async_trait]
impl BaseUrlResolver for OpenShiftClient {
    async fn route_url(&self, service_name: &str) -> Option<String> {
        match self.fetch_route_url(service_name).await {
            Ok(url) => {
                info!(url = %url, service = %service_name, "Found route URL");
                Some(url)
            }
            Err(ResolverError::RouteNotFound { .. }) => {
                warn!(service = %service_name, "No route found for service");
                None
            }
            Err(e) => {
                error!(error = %e, "Error retrieving route from OpenShift");
                None
            }
        }
    }

    async fn test_connection(&self) -> bool {
        match self.check_connection().await {
            Ok(()) => {
                info!("Successfully connected to OpenShift");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to connect to OpenShift");
                false
            }
        }
    }
}
