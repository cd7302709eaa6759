//! Application configuration file.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use windsock_core::config::{ConfigLoader, WindsockConfig};
use windsock_telemetry::logging::{LogConfig, LogFormat, LogOutput};
use windsock_telemetry::metrics::MetricsConfig;

/// Everything the CLI reads from its configuration file.
///
/// Channel settings sit at the top level; logging and metrics have their own
/// sections.
///
/// ```yaml
/// base_url: https://api.example.com/stream/
/// defaults:
///   retry_attempts: 5
///   retry_base_delay_ms: 500
/// logging:
///   level: info
///   format: pretty
/// metrics:
///   enabled: true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Registry settings
    #[serde(flatten)]
    pub channels: WindsockConfig,

    /// Logging settings
    #[serde(default = "default_logging")]
    pub logging: LogConfig,

    /// Metrics settings
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            channels: WindsockConfig::default(),
            logging: default_logging(),
            metrics: MetricsConfig::default(),
        }
    }
}

/// Stdout carries channel output, so logs default to stderr.
fn default_logging() -> LogConfig {
    LogConfig {
        format: LogFormat::Pretty,
        outputs: vec![LogOutput::Stderr],
        ..LogConfig::default()
    }
}

impl AppConfig {
    /// Loads the configuration file, or the defaults when no path is given.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = match path {
            Some(path) => ConfigLoader::new()
                .load_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Self::default(),
        };
        config
            .channels
            .validate()
            .context("Invalid channel configuration")?;
        Ok(config)
    }
}
