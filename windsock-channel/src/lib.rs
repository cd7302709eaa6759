//! # Windsock Channel
//!
//! Shared, self-healing streaming channels.
//!
//! A [`ChannelRegistry`] keeps at most one live connection per channel name.
//! Consumers acquire a [`ChannelHandle`] and attach message or state streams
//! to it; the connection is opened by the first acquire, reconnected with
//! exponential backoff while it drops, and closed when the last stream
//! detaches or the retry policy runs out.
//!
//! ## Components
//!
//! - [`ChannelRegistry`]: name-keyed table with dedupe, ref-counting and disposal
//! - [`ChannelHandle`], [`MessageStream`], [`StateStream`]: consumer side
//! - [`StateTracker`]: latest connection state, replayed to new observers
//! - [`AddressResolver`]: maps request targets onto `ws`/`wss` addresses
//! - [`ws`]: the [`Transport`](ws::Transport) seam and its WebSocket implementation

#![warn(missing_docs)]
#![allow(clippy::missing_const_for_fn)]

mod address;
mod driver;
mod fanout;
mod handle;
mod registry;
mod request;
mod state;

/// WebSocket transport and frame codec
pub mod ws;

#[cfg(test)]
mod testing;

pub use address::AddressResolver;
pub use handle::{ChannelHandle, MessageStream, StateStream};
pub use registry::{ChannelRegistry, ChannelSnapshot};
pub use request::ChannelRequest;
pub use state::{ConnectionState, StateTracker};

use serde::de::DeserializeOwned;

/// Payload types a channel can carry: decodable from JSON and cheap enough to
/// clone once per consumer.
pub trait Payload: DeserializeOwned + Clone + Send + 'static {}

impl<T> Payload for T where T: DeserializeOwned + Clone + Send + 'static {}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AddressResolver, ChannelHandle, ChannelRegistry, ChannelRequest, ChannelSnapshot,
        ConnectionState, MessageStream, Payload, StateStream,
    };
}
