//! Span definitions for channel tracing.

use tracing::{Span, debug_span, info_span};

/// Create a span covering the whole life of a channel's connection driver.
///
/// # Example
///
/// ```
/// use windsock_telemetry::spans::channel_span;
///
/// let span = channel_span("market-depth:BTCUSDT:20", "wss://host/depth");
/// let _guard = span.enter();
/// ```
#[must_use]
pub fn channel_span(channel: &str, target: &str) -> Span {
    info_span!("channel", channel = %channel, target = %target)
}

/// Create a span for a single connection attempt.
///
/// `attempt` is zero for the initial connect and counts reconnects after that.
#[must_use]
pub fn connection_span(channel: &str, attempt: u32) -> Span {
    debug_span!("connection", channel = %channel, attempt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_can_be_entered() {
        let span = channel_span("trades:BTCUSDT", "wss://host/trades");
        let _guard = span.enter();

        let inner = connection_span("trades:BTCUSDT", 2);
        let _inner_guard = inner.enter();
    }
}
