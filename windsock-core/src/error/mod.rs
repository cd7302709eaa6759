//! Error types and handling framework.
//!
//! # Error Hierarchy
//!
//! - `WindsockError` - Top-level error type
//!   - `NetworkError` - Transport failures, absorbed by the reconnect loop
//!   - `ChannelError` - Registry conflicts and terminal channel failures
//!   - `ConfigError` - Configuration loading and validation errors

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Error severity levels for categorizing errors.
///
/// # Examples
///
/// ```
/// use windsock_core::error::ErrorSeverity;
///
/// let severity = ErrorSeverity::Recoverable;
/// assert!(severity.is_recoverable());
/// assert!(!severity.is_fatal());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ErrorSeverity {
    /// Unrecoverable error requiring immediate attention.
    Fatal,

    /// Error that the system retries or works around.
    #[default]
    Recoverable,

    /// Non-critical issue that should be logged.
    Warning,

    /// Informational message about an expected condition.
    Info,
}

impl ErrorSeverity {
    /// Returns true if this error is recoverable (not fatal).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Fatal)
    }

    /// Returns true if this error is fatal (unrecoverable).
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal)
    }

    /// Returns true if this is a warning level severity.
    #[must_use]
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::Warning)
    }

    /// Returns the severity as a static string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fatal => "FATAL",
            Self::Recoverable => "RECOVERABLE",
            Self::Warning => "WARNING",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

mod channel;
mod config;
mod network;

pub use channel::ChannelError;
pub use config::ConfigError;
pub use network::NetworkError;

/// Top-level error type for windsock.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindsockError {
    /// Network-related error.
    #[error("{0}")]
    Network(#[from] NetworkError),

    /// Channel registry or lifecycle error.
    #[error("{0}")]
    Channel(#[from] ChannelError),

    /// Configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

impl WindsockError {
    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Network(e) => e.severity(),
            Self::Channel(e) => e.severity(),
            Self::Config(e) => e.severity(),
        }
    }

    /// Returns true if this error is recoverable.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        self.severity().is_recoverable()
    }

    /// Returns the error category as a string.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Channel(_) => "channel",
            Self::Config(_) => "config",
        }
    }

    /// Returns the inner channel error, if this is a channel error.
    #[must_use]
    pub fn as_channel_error(&self) -> Option<&ChannelError> {
        match self {
            Self::Channel(e) => Some(e),
            _ => None,
        }
    }
}

/// A specialized Result type for windsock operations.
pub type Result<T> = std::result::Result<T, WindsockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity_display() {
        assert_eq!(ErrorSeverity::Fatal.to_string(), "FATAL");
        assert_eq!(ErrorSeverity::Recoverable.to_string(), "RECOVERABLE");
        assert_eq!(ErrorSeverity::Warning.to_string(), "WARNING");
        assert_eq!(ErrorSeverity::Info.to_string(), "INFO");
    }

    #[test]
    fn test_network_error_conversion() {
        let err: WindsockError = NetworkError::Timeout { timeout_ms: 5000 }.into();
        assert_eq!(err.category(), "network");
        assert!(err.is_recoverable());
        assert!(err.as_channel_error().is_none());
    }

    #[test]
    fn test_channel_error_conversion() {
        let channel_err = ChannelError::RetriesExhausted {
            name: "a".to_string(),
            attempts: 3,
        };
        let err: WindsockError = channel_err.clone().into();
        assert_eq!(err.category(), "channel");
        assert!(!err.is_recoverable());
        assert_eq!(err.as_channel_error(), Some(&channel_err));
    }

    #[test]
    fn test_display_is_transparent() {
        let err = WindsockError::Config(ConfigError::InvalidValue {
            field: "base_url".to_string(),
            reason: "empty".to_string(),
        });
        assert!(err.to_string().starts_with("[Config]"));
    }
}
