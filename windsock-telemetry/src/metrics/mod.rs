//! Metrics collection and export.
//!
//! Channel code records through [`ChannelMetrics`] unconditionally; the calls
//! are no-ops until [`init_metrics`] installs a Prometheus recorder.

mod config;
mod recorder;

pub use config::MetricsConfig;
pub use recorder::ChannelMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();
static METRICS_INSTALLED: OnceLock<()> = OnceLock::new();

/// Initialize the metrics system with the given configuration.
///
/// With `expose_endpoint` the exporter serves `/metrics` itself (on the
/// current Tokio runtime, or a background one if none is running) and
/// [`render_metrics`] stays empty; otherwise the caller renders on demand.
///
/// # Errors
///
/// Returns an error if the endpoint address is invalid or a recorder is
/// already installed.
pub fn init_metrics(config: &MetricsConfig) -> Result<(), MetricsError> {
    if METRICS_INSTALLED.get().is_some() {
        return Err(MetricsError::AlreadyInitialized);
    }

    let builder = PrometheusBuilder::new();

    if config.expose_endpoint {
        let addr: SocketAddr = config
            .endpoint_address
            .parse()
            .map_err(|e| MetricsError::InvalidAddress(format!("{e}")))?;

        builder
            .with_http_listener(addr)
            .install()
            .map_err(|e| MetricsError::InitializationFailed(format!("{e}")))?;
    } else {
        let handle = builder
            .install_recorder()
            .map_err(|e| MetricsError::InitializationFailed(format!("{e}")))?;
        METRICS_HANDLE
            .set(handle)
            .map_err(|_| MetricsError::AlreadyInitialized)?;
    }

    METRICS_INSTALLED
        .set(())
        .map_err(|_| MetricsError::AlreadyInitialized)?;

    ChannelMetrics::register();

    Ok(())
}

/// Get the Prometheus metrics output as a string.
///
/// Returns an empty string if metrics have not been initialized.
#[must_use]
pub fn render_metrics() -> String {
    METRICS_HANDLE
        .get()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Errors that can occur during metrics initialization.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    /// Metrics already initialized
    #[error("Metrics system already initialized")]
    AlreadyInitialized,

    /// Invalid endpoint address
    #[error("Invalid endpoint address: {0}")]
    InvalidAddress(String),

    /// Initialization failed
    #[error("Metrics initialization failed: {0}")]
    InitializationFailed(String),
}
