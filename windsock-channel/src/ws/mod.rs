//! WebSocket transport and frame codec.

mod message;
mod transport;

pub use message::{MessageCodec, WebSocketMessage};
pub use transport::{FrameStream, Transport, WebSocketTransport};
