//! Metrics configuration types.

use serde::{Deserialize, Serialize};

/// Configuration for the metrics system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Whether to install a Prometheus recorder at all
    #[serde(default)]
    pub enabled: bool,

    /// Whether to expose a Prometheus HTTP endpoint
    #[serde(default = "default_expose_endpoint")]
    pub expose_endpoint: bool,

    /// Address for the Prometheus endpoint (e.g., "127.0.0.1:9464")
    #[serde(default = "default_endpoint_address")]
    pub endpoint_address: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            expose_endpoint: default_expose_endpoint(),
            endpoint_address: default_endpoint_address(),
        }
    }
}

fn default_expose_endpoint() -> bool {
    true
}

fn default_endpoint_address() -> String {
    "127.0.0.1:9464".to_string()
}
