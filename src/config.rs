//! Application configuration loaded from environment variables.

use std::time::Duration;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Contrast Security (route source) ===
    /// Contrast API base URL (e.g., https://app.contrastsecurity.com/Contrast/api).
    #[serde(default)]
    pub contrast_api_url: String,

    /// Contrast API key, sent as the `API-Key` header.
    #[serde(default)]
    pub contrast_api_key: String,

    /// Contrast user name for basic auth.
    #[serde(default)]
    pub contrast_username: String,

    /// Contrast service key for basic auth.
    #[serde(default)]
    pub contrast_service_key: String,

    /// Contrast organization ID.
    #[serde(default)]
    pub contrast_organization_id: String,

    /// Timeout for Contrast API calls in milliseconds.
    #[serde(default = "default_contrast_timeout")]
    pub contrast_timeout_ms: u64,

    // === OpenShift (base URL resolver) ===
    /// OpenShift API server URL.
    #[serde(default)]
    pub openshift_api_url: Option<String>,

    /// OpenShift bearer token.
    #[serde(default)]
    pub openshift_token: Option<String>,

    /// Namespace holding the service routes.
    #[serde(default)]
    pub openshift_namespace: Option<String>,

    /// Timeout for OpenShift API calls in milliseconds.
    #[serde(default = "default_openshift_timeout")]
    pub openshift_timeout_ms: u64,

    // === Route Testing ===
    /// Per-probe timeout in milliseconds.
    #[serde(default = "default_route_timeout")]
    pub route_timeout_ms: u64,

    /// Maximum probes in flight at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Retry attempts per route. Read but never applied.
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Re-sort results into route input order before reporting.
    #[serde(default)]
    pub stable_result_order: bool,

    /// TCP connect timeout for the shared probe client in milliseconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_ms: u64,

    // === Server Configuration ===
    /// HTTP server port for the API.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,

    /// Install the Prometheus recorder and serve `/metrics`.
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_contrast_timeout() -> u64 {
    30_000
}

fn default_openshift_timeout() -> u64 {
    30_000
}

fn default_route_timeout() -> u64 {
    10_000
}

fn default_max_concurrent() -> usize {
    10
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_connect_timeout() -> u64 {
    30_000
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            contrast_api_url: String::new(),
            contrast_api_key: String::new(),
            contrast_username: String::new(),
            contrast_service_key: String::new(),
            contrast_organization_id: String::new(),
            contrast_timeout_ms: default_contrast_timeout(),
            openshift_api_url: None,
            openshift_token: None,
            openshift_namespace: None,
            openshift_timeout_ms: default_openshift_timeout(),
            route_timeout_ms: default_route_timeout(),
            max_concurrent: default_max_concurrent(),
            retry_attempts: default_retry_attempts(),
            stable_result_order: false,
            connect_timeout_ms: default_connect_timeout(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
            metrics_enabled: true,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        let required = [
            ("CONTRAST_API_URL", &self.contrast_api_url),
            ("CONTRAST_API_KEY", &self.contrast_api_key),
            ("CONTRAST_USERNAME", &self.contrast_username),
            ("CONTRAST_SERVICE_KEY", &self.contrast_service_key),
            ("CONTRAST_ORGANIZATION_ID", &self.contrast_organization_id),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(format!("{} is required", name));
            }
        }

        if url::Url::parse(&self.contrast_api_url).is_err() {
            return Err("CONTRAST_API_URL must be an absolute URL".to_string());
        }

        if self.max_concurrent == 0 {
            return Err("MAX_CONCURRENT must be at least 1".to_string());
        }

        if self.route_timeout_ms == 0 {
            return Err("ROUTE_TIMEOUT_MS must be greater than 0".to_string());
        }

        let openshift_set = [
            self.openshift_api_url.is_some(),
            self.openshift_token.is_some(),
            self.openshift_namespace.is_some(),
        ];
        if openshift_set.contains(&true) && openshift_set.contains(&false) {
            return Err(
                "OPENSHIFT_API_URL, OPENSHIFT_TOKEN and OPENSHIFT_NAMESPACE must be set together"
                    .to_string(),
            );
        }

        Ok(())
    }

    /// Per-probe timeout.
    pub fn route_timeout(&self) -> Duration {
        Duration::from_millis(self.route_timeout_ms)
    }

    /// Contrast API call timeout.
    pub fn contrast_timeout(&self) -> Duration {
        Duration::from_millis(self.contrast_timeout_ms)
    }

    /// OpenShift API call timeout.
    pub fn openshift_timeout(&self) -> Duration {
        Duration::from_millis(self.openshift_timeout_ms)
    }

    /// Check if the OpenShift resolver is configured.
    pub fn has_openshift(&self) -> bool {
        self.openshift_api_url.is_some()
            && self.openshift_token.is_some()
            && self.openshift_namespace.is_some()
    }
}
