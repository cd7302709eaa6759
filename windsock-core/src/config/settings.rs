//! Channel subsystem configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;
use crate::types::RetryPolicy;

/// Top-level configuration for the channel subsystem.
///
/// # Example
///
/// ```yaml
/// base_url: https://dashboard.example.com
/// defaults:
///   retry_attempts: 10
///   retry_base_delay_ms: 500
/// transport:
///   connect_timeout_ms: 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindsockConfig {
    /// Base address that relative channel targets are resolved against.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Retry defaults for channels that do not set their own.
    #[serde(default)]
    pub defaults: ChannelDefaults,

    /// Transport settings.
    #[serde(default)]
    pub transport: TransportConfig,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

impl Default for WindsockConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            defaults: ChannelDefaults::default(),
            transport: TransportConfig::default(),
        }
    }
}

impl WindsockConfig {
    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first invalid value found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            field: "base_url".to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https" | "ws" | "wss") {
            return Err(ConfigError::InvalidValue {
                field: "base_url".to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        self.defaults.validate()?;
        self.transport.validate()
    }
}

/// Retry defaults applied when a channel request leaves them unset.
///
/// Unbounded attempts by default; bounded retries are an explicit opt-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelDefaults {
    /// Maximum reconnect attempts (`None` = unbounded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,

    /// Base reconnect delay in milliseconds.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_retry_base_delay_ms() -> u64 {
    1_000
}

impl Default for ChannelDefaults {
    fn default() -> Self {
        Self {
            retry_attempts: None,
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl ChannelDefaults {
    /// Returns the retry policy these defaults describe.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry_attempts,
            base_delay: Duration::from_millis(self.retry_base_delay_ms),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.retry_base_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "defaults.retry_base_delay_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.retry_attempts == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "defaults.retry_attempts".to_string(),
                reason: "must be greater than zero when set".to_string(),
            });
        }
        Ok(())
    }
}

/// Transport configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Handshake timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: default_connect_timeout_ms(),
        }
    }
}

impl TransportConfig {
    /// Creates a new builder for `TransportConfig`.
    #[must_use]
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }

    /// Returns the handshake timeout as a Duration.
    #[must_use]
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "transport.connect_timeout_ms".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for `TransportConfig`.
#[derive(Debug, Default)]
pub struct TransportConfigBuilder {
    connect_timeout_ms: Option<u64>,
}

impl TransportConfigBuilder {
    /// Sets the handshake timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Builds the `TransportConfig`.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        TransportConfig {
            connect_timeout_ms: self
                .connect_timeout_ms
                .unwrap_or_else(default_connect_timeout_ms),
        }
    }
}
