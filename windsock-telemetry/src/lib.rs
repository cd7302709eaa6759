//! # Windsock Telemetry
//!
//! Logging, tracing spans and metrics for the windsock channel subsystem.
//!
//! - **Structured Logging**: `tracing` events rendered as JSON or pretty text
//!   to stdout and/or rolling files
//! - **Spans**: one span per channel and per connection attempt
//! - **Metrics**: Prometheus-compatible counters and gauges for channel
//!   lifecycle, reconnects and message throughput

#![warn(missing_docs)]

/// Logging configuration and initialization
pub mod logging;

/// Span definitions for channel tracing
pub mod spans;

/// Metrics collection and export
pub mod metrics;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::logging::{LogConfig, LogFormat, LogOutput, init_logging};
    pub use crate::metrics::{ChannelMetrics, MetricsConfig, init_metrics};
    pub use crate::spans::*;
}
