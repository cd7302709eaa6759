//! Channel metrics recorder with pre-defined metrics.

use metrics::{counter, describe_counter, describe_gauge, gauge};

/// Pre-defined metrics for the channel subsystem.
///
/// All metrics follow the naming convention: `windsock_<category>_<metric>`.
/// Labels carry the channel kind (the name prefix before `:`), never the full
/// channel name, to keep cardinality bounded.
pub struct ChannelMetrics;

impl ChannelMetrics {
    /// Register all metric descriptions.
    pub fn register() {
        // Registry metrics
        describe_gauge!("windsock_channels_active", "Number of live registry entries");
        describe_gauge!(
            "windsock_consumers_attached",
            "Number of consumers attached across all channels"
        );
        describe_counter!(
            "windsock_channel_conflicts_total",
            "Acquire calls rejected for a target or payload mismatch"
        );

        // Connection metrics
        describe_gauge!(
            "windsock_connections_open",
            "Number of channels with an established connection"
        );
        describe_counter!(
            "windsock_connection_attempts_total",
            "Total number of handshake attempts, initial and reconnect"
        );
        describe_counter!(
            "windsock_connection_failures_total",
            "Total number of handshake failures and dropped connections"
        );
        describe_counter!(
            "windsock_retries_exhausted_total",
            "Channels that gave up after exhausting their retry policy"
        );

        // Message metrics
        describe_counter!(
            "windsock_messages_received_total",
            "Total number of messages delivered to a channel"
        );
        describe_counter!(
            "windsock_decode_failures_total",
            "Total number of frames dropped because they failed to decode"
        );
    }

    // ==================== Registry Metrics ====================

    /// Record a registry entry being created.
    pub fn channel_created(kind: &str) {
        gauge!("windsock_channels_active", "kind" => kind.to_string()).increment(1.0);
    }

    /// Record a registry entry being disposed.
    pub fn channel_disposed(kind: &str) {
        gauge!("windsock_channels_active", "kind" => kind.to_string()).decrement(1.0);
    }

    /// Record a consumer attaching to a channel.
    pub fn consumer_attached(kind: &str) {
        gauge!("windsock_consumers_attached", "kind" => kind.to_string()).increment(1.0);
    }

    /// Record a consumer detaching from a channel.
    pub fn consumer_detached(kind: &str) {
        gauge!("windsock_consumers_attached", "kind" => kind.to_string()).decrement(1.0);
    }

    /// Record an acquire rejected for a mismatched target or payload type.
    pub fn channel_conflict(kind: &str) {
        counter!("windsock_channel_conflicts_total", "kind" => kind.to_string()).increment(1);
    }

    // ==================== Connection Metrics ====================

    /// Record a handshake attempt.
    pub fn connection_attempt(kind: &str) {
        counter!("windsock_connection_attempts_total", "kind" => kind.to_string()).increment(1);
    }

    /// Record a handshake completing.
    pub fn connection_opened(kind: &str) {
        gauge!("windsock_connections_open", "kind" => kind.to_string()).increment(1.0);
    }

    /// Record an established connection going away.
    pub fn connection_closed(kind: &str) {
        gauge!("windsock_connections_open", "kind" => kind.to_string()).decrement(1.0);
    }

    /// Record a failed handshake or a dropped connection.
    pub fn connection_failure(kind: &str) {
        counter!("windsock_connection_failures_total", "kind" => kind.to_string()).increment(1);
    }

    /// Record a channel giving up.
    pub fn retries_exhausted(kind: &str) {
        counter!("windsock_retries_exhausted_total", "kind" => kind.to_string()).increment(1);
    }

    // ==================== Message Metrics ====================

    /// Record a decoded message.
    pub fn message_received(kind: &str) {
        counter!("windsock_messages_received_total", "kind" => kind.to_string()).increment(1);
    }

    /// Record a frame dropped because it failed to decode.
    pub fn decode_failure(kind: &str) {
        counter!("windsock_decode_failures_total", "kind" => kind.to_string()).increment(1);
    }
}
