//! The transport seam between connection drivers and the network.

use async_trait::async_trait;
use futures::future;
use futures::stream::{BoxStream, StreamExt};
use tokio::time::timeout;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{Error as TungsteniteError, Message as TungsteniteMessage};
use tracing::debug;
use windsock_core::config::TransportConfig;
use windsock_core::error::NetworkError;
use windsock_core::types::TargetAddress;

use super::message::WebSocketMessage;

/// Inbound data frames of one open connection.
///
/// The stream ending is a normal close; an `Err` item is a dropped connection.
/// Either way the driver treats the connection as gone.
pub type FrameStream = BoxStream<'static, Result<WebSocketMessage, NetworkError>>;

/// Opens connections on behalf of a connection driver.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Performs the handshake with `address` and returns its inbound frames.
    async fn connect(&self, address: &TargetAddress) -> Result<FrameStream, NetworkError>;
}

/// WebSocket transport over `tokio-tungstenite`.
#[derive(Debug, Clone, Default)]
pub struct WebSocketTransport {
    config: TransportConfig,
}

impl WebSocketTransport {
    /// Creates a transport with the given settings.
    #[must_use]
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    /// Returns the transport settings.
    #[must_use]
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn map_handshake_error(error: TungsteniteError) -> NetworkError {
        match error {
            TungsteniteError::Tls(e) => NetworkError::Tls {
                reason: e.to_string(),
            },
            other => NetworkError::ConnectionFailed {
                reason: other.to_string(),
            },
        }
    }

    fn from_tungstenite_message(msg: TungsteniteMessage) -> Option<WebSocketMessage> {
        match msg {
            TungsteniteMessage::Text(text) => Some(WebSocketMessage::Text(text.as_str().to_owned())),
            TungsteniteMessage::Binary(data) => Some(WebSocketMessage::Binary(data.to_vec())),
            TungsteniteMessage::Ping(_)
            | TungsteniteMessage::Pong(_)
            | TungsteniteMessage::Close(_)
            | TungsteniteMessage::Frame(_) => None,
        }
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn connect(&self, address: &TargetAddress) -> Result<FrameStream, NetworkError> {
        debug!(target_url = %address, "Opening WebSocket connection");

        let (ws_stream, _response) = timeout(
            self.config.connect_timeout(),
            connect_async(address.as_str()),
        )
        .await
        .map_err(|_| NetworkError::Timeout {
            timeout_ms: self.config.connect_timeout_ms,
        })?
        .map_err(Self::map_handshake_error)?;

        // Pongs are queued by tungstenite and flushed on the next read, so a
        // read-only stream keeps the connection alive.
        let frames = ws_stream
            .take_while(|frame| future::ready(!matches!(frame, Ok(TungsteniteMessage::Close(_)))))
            .filter_map(|frame| {
                future::ready(match frame {
                    Ok(msg) => Self::from_tungstenite_message(msg).map(Ok),
                    Err(e) => Some(Err(NetworkError::WebSocket {
                        reason: e.to_string(),
                    })),
                })
            });

        Ok(frames.boxed())
    }
}
