//! WebSocket data frames and the JSON payload codec.

use serde::de::DeserializeOwned;
use windsock_core::error::NetworkError;

/// A data frame received from the server.
///
/// Control frames (ping, pong, close) are handled inside the transport and
/// never surface as a `WebSocketMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebSocketMessage {
    /// Text frame.
    Text(String),
    /// Binary frame.
    Binary(Vec<u8>),
}

impl WebSocketMessage {
    /// Creates a text message.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    /// Creates a binary message.
    #[must_use]
    pub fn binary(data: impl Into<Vec<u8>>) -> Self {
        Self::Binary(data.into())
    }

    /// Returns the payload length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Text(s) => s.len(),
            Self::Binary(b) => b.len(),
        }
    }

    /// Returns true if the payload is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// JSON codec between data frames and channel payload types.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageCodec;

impl MessageCodec {
    /// Creates a new message codec.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Decodes a text or binary frame holding JSON.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` if deserialization fails.
    pub fn decode<T: DeserializeOwned>(
        &self,
        message: &WebSocketMessage,
    ) -> Result<T, NetworkError> {
        match message {
            WebSocketMessage::Text(text) => {
                serde_json::from_str(text).map_err(|e| NetworkError::WebSocket {
                    reason: format!("Failed to deserialize message: {e}"),
                })
            }
            WebSocketMessage::Binary(data) => {
                serde_json::from_slice(data).map_err(|e| NetworkError::WebSocket {
                    reason: format!("Failed to deserialize binary message: {e}"),
                })
            }
        }
    }
}
