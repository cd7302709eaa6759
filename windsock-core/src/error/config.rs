//! Configuration-related error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error type covering invalid values and file access errors.
///
/// # Examples
///
/// ```
/// use windsock_core::error::ConfigError;
///
/// let error = ConfigError::InvalidValue {
///     field: "base_url".to_string(),
///     reason: "empty".to_string(),
/// };
/// assert!(error.to_string().contains("base_url"));
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// Configuration value is invalid.
    #[error("[Config] Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Field with the invalid value.
        field: String,
        /// Reason why the value is invalid.
        reason: String,
    },

    /// Configuration file could not be read.
    #[error("[Config] Failed to read file '{path}': {reason}")]
    FileReadError {
        /// Path to the configuration file.
        path: String,
        /// Reason for the read failure.
        reason: String,
    },

    /// Configuration file format is invalid.
    #[error("[Config] Invalid format in '{path}': {reason}")]
    InvalidFormat {
        /// Path to the configuration file.
        path: String,
        /// Reason for the format error.
        reason: String,
    },
}

impl ConfigError {
    /// Returns the severity level of this error.
    ///
    /// A broken configuration prevents startup, so every variant is fatal.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        super::ErrorSeverity::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_read_error() {
        let error = ConfigError::FileReadError {
            path: "/etc/windsock.yaml".to_string(),
            reason: "No such file".to_string(),
        };
        assert!(error.to_string().contains("/etc/windsock.yaml"));
        assert!(error.severity().is_fatal());
    }
}
