//! Channel-level error types.
//!
//! `RetriesExhausted` is the only error a message consumer ever observes; the
//! remaining variants are returned synchronously from `acquire`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the channel registry and delivered to channel consumers.
///
/// # Examples
///
/// ```
/// use windsock_core::error::ChannelError;
///
/// let error = ChannelError::RetriesExhausted {
///     name: "market-depth:BTCUSDT:20".to_string(),
///     attempts: 3,
/// };
/// assert!(error.is_terminal());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelError {
    /// The retry policy ran out of reconnect attempts.
    #[error("[Channel] '{name}' gave up after {attempts} reconnect attempts")]
    RetriesExhausted {
        /// Channel name.
        name: String,
        /// Number of reconnect attempts made.
        attempts: u32,
    },

    /// A live channel was requested again with a different target.
    #[error("[Channel] '{name}' is bound to {existing}, cannot rebind to {requested}")]
    TargetConflict {
        /// Channel name.
        name: String,
        /// Target of the live entry.
        existing: String,
        /// Target of the rejected request.
        requested: String,
    },

    /// A live channel was requested again with a different payload type.
    #[error("[Channel] '{name}' carries {existing}, requested as {requested}")]
    PayloadTypeMismatch {
        /// Channel name.
        name: String,
        /// Payload type of the live entry.
        existing: String,
        /// Payload type of the rejected request.
        requested: String,
    },

    /// The channel name is empty or malformed.
    #[error("[Channel] Invalid channel name '{name}': {reason}")]
    InvalidName {
        /// Offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The target could not be resolved to a streaming address.
    #[error("[Channel] Invalid target '{target}': {reason}")]
    InvalidAddress {
        /// Offending target.
        target: String,
        /// Why it was rejected.
        reason: String,
    },

    /// `acquire` was called outside a Tokio runtime.
    #[error("[Channel] No async runtime available to drive '{name}'")]
    NoRuntime {
        /// Channel name.
        name: String,
    },
}

impl ChannelError {
    /// Returns true if this error ends a channel's message sequence.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }

    /// Returns true if this error is a caller mistake rather than a runtime condition.
    #[must_use]
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Self::TargetConflict { .. } | Self::PayloadTypeMismatch { .. } | Self::NoRuntime { .. }
        )
    }

    /// Returns the severity level of this error.
    #[must_use]
    pub fn severity(&self) -> super::ErrorSeverity {
        use super::ErrorSeverity;
        match self {
            Self::RetriesExhausted { .. }
            | Self::TargetConflict { .. }
            | Self::PayloadTypeMismatch { .. }
            | Self::NoRuntime { .. } => ErrorSeverity::Fatal,
            Self::InvalidName { .. } | Self::InvalidAddress { .. } => ErrorSeverity::Warning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_conflict_message() {
        let error = ChannelError::TargetConflict {
            name: "trades".to_string(),
            existing: "wss://a/feed".to_string(),
            requested: "wss://b/feed".to_string(),
        };
        let text = error.to_string();
        assert!(text.contains("wss://a/feed"));
        assert!(text.contains("wss://b/feed"));
        assert!(error.is_programming_error());
        assert!(!error.is_terminal());
    }

    #[test]
    fn test_retries_exhausted_is_terminal() {
        let error = ChannelError::RetriesExhausted {
            name: "a".to_string(),
            attempts: 3,
        };
        assert!(error.is_terminal());
        assert!(error.severity().is_fatal());
        assert!(error.to_string().contains("3 reconnect attempts"));
    }

    #[test]
    fn test_invalid_address_is_warning() {
        let error = ChannelError::InvalidAddress {
            target: "ftp://x".to_string(),
            reason: "unsupported scheme".to_string(),
        };
        assert!(error.severity().is_warning());
    }
}
