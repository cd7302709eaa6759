//! Channel acquisition requests.

use std::time::Duration;
use windsock_core::types::RetryPolicy;

/// Describes the channel a consumer wants to acquire.
///
/// Retry settings left unset fall back to the registry defaults. They only
/// take effect when the request creates the entry; a request that joins a
/// live entry shares that entry's policy.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use windsock_channel::ChannelRequest;
///
/// let request = ChannelRequest::new("market-depth:BTCUSDT:20", "/depth/BTCUSDT")
///     .retry_attempts(3)
///     .retry_base_delay(Duration::from_millis(500));
/// assert_eq!(request.name(), "market-depth:BTCUSDT:20");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRequest {
    name: String,
    target: String,
    max_attempts: Option<Option<u32>>,
    base_delay: Option<Duration>,
}

impl ChannelRequest {
    /// Creates a request for `name` bound to `target`.
    #[must_use]
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            max_attempts: None,
            base_delay: None,
        }
    }

    /// Gives up after `attempts` failed reconnects.
    #[must_use]
    pub fn retry_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(Some(attempts));
        self
    }

    /// Retries forever.
    #[must_use]
    pub fn unbounded_retries(mut self) -> Self {
        self.max_attempts = Some(None);
        self
    }

    /// Sets the delay before the first reconnect.
    #[must_use]
    pub fn retry_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = Some(delay);
        self
    }

    /// Returns the requested channel name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the requested target.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Fills unset retry settings from `defaults`.
    #[must_use]
    pub fn retry_policy(&self, defaults: RetryPolicy) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            base_delay: self.base_delay.unwrap_or(defaults.base_delay),
        }
    }
}
