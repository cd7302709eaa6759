//! Reconnect retry policy.

use std::time::Duration;

/// Default base delay between reconnect attempts.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(1_000);

/// Reconnect budget attached to a channel at creation time.
///
/// The delay before reconnect attempt `n` (zero-indexed) is
/// `base_delay * 2^n`, without jitter or cap. The attempt counter is owned
/// by the connection driver and resets after every successful handshake.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use windsock_core::types::RetryPolicy;
///
/// let policy = RetryPolicy::bounded(3, Duration::from_millis(500));
/// assert_eq!(policy.delay_for(2), Duration::from_millis(2_000));
/// assert!(policy.allows(2));
/// assert!(!policy.allows(3));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum reconnect attempts; `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Delay before the first reconnect attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded(DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// Creates a policy that never gives up.
    #[must_use]
    pub const fn unbounded(base_delay: Duration) -> Self {
        Self {
            max_attempts: None,
            base_delay,
        }
    }

    /// Creates a policy that gives up after `max_attempts` reconnects.
    #[must_use]
    pub const fn bounded(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            base_delay,
        }
    }

    /// Returns true if reconnect attempt `attempt` (zero-indexed) may be made.
    #[must_use]
    pub fn allows(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt < max)
    }

    /// Returns the delay before reconnect attempt `attempt` (zero-indexed).
    ///
    /// Saturates at `Duration::MAX` instead of overflowing.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        2u32.checked_pow(attempt)
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy::unbounded(Duration::from_secs(1));

        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for(10), Duration::from_secs(1024));
    }

    #[test]
    fn test_backoff_saturates() {
        let policy = RetryPolicy::unbounded(Duration::from_secs(1));
        assert_eq!(policy.delay_for(40), Duration::MAX);
        assert_eq!(policy.delay_for(u32::MAX), Duration::MAX);
    }

    #[test]
    fn test_allows() {
        let bounded = RetryPolicy::bounded(3, Duration::from_secs(1));
        assert!(bounded.allows(0));
        assert!(bounded.allows(1));
        assert!(bounded.allows(2));
        assert!(!bounded.allows(3));

        let zero = RetryPolicy::bounded(0, Duration::from_secs(1));
        assert!(!zero.allows(0));

        let unbounded = RetryPolicy::default();
        assert!(unbounded.allows(10_000));
    }

    #[test]
    fn test_default_is_unbounded_one_second() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, None);
        assert_eq!(policy.base_delay, Duration::from_millis(1_000));
    }
}
