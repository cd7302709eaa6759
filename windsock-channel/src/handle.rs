//! Subscriber handles and the consumer streams they hand out.
//!
//! Every stream obtained from a [`ChannelHandle`] is one attachment: it holds
//! one reference on the registry entry until it is detached or dropped. The
//! last detachment disposes the entry and stops its connection.

use futures::Stream;
use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use windsock_core::error::ChannelError;
use windsock_core::types::{ChannelName, TargetAddress};
use windsock_telemetry::metrics::ChannelMetrics;

use crate::Payload;
use crate::fanout::{Delivery, Fanout};
use crate::registry::RegistryShared;
use crate::state::{ConnectionState, StateTracker};

/// Streams shared by every handle of one registry entry.
pub(crate) struct ChannelCore<M> {
    pub(crate) entry_id: u64,
    pub(crate) messages: Arc<Fanout<M>>,
    pub(crate) state: Arc<StateTracker>,
}

/// A consumer's view of a shared channel.
///
/// Cloning a handle is free and does not attach anything; only the streams
/// returned by [`messages`](Self::messages) and [`state`](Self::state) count
/// as consumers.
pub struct ChannelHandle<M> {
    name: ChannelName,
    target: TargetAddress,
    core: Arc<ChannelCore<M>>,
    registry: Weak<RegistryShared>,
}

impl<M> Clone for ChannelHandle<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            target: self.target.clone(),
            core: Arc::clone(&self.core),
            registry: Weak::clone(&self.registry),
        }
    }
}

impl<M> fmt::Debug for ChannelHandle<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("state", &self.core.state.current())
            .finish_non_exhaustive()
    }
}

impl<M: Payload> ChannelHandle<M> {
    pub(crate) fn new(
        name: ChannelName,
        target: TargetAddress,
        core: Arc<ChannelCore<M>>,
        registry: Weak<RegistryShared>,
    ) -> Self {
        Self {
            name,
            target,
            core,
            registry,
        }
    }

    /// Returns the channel name.
    #[must_use]
    pub fn name(&self) -> &ChannelName {
        &self.name
    }

    /// Returns the resolved streaming address.
    #[must_use]
    pub fn target(&self) -> &TargetAddress {
        &self.target
    }

    /// Returns the latest connection state.
    #[must_use]
    pub fn current_state(&self) -> ConnectionState {
        self.core.state.current()
    }

    /// Attaches a consumer of decoded messages.
    ///
    /// The stream yields every message received after this call. If the
    /// channel gives up it yields one `Err(ChannelError::RetriesExhausted)`
    /// and ends. On a disposed channel the stream is already finished.
    #[must_use = "dropping the stream detaches it immediately"]
    pub fn messages(&self) -> MessageStream<M> {
        let attachment = Attachment::new(&self.registry, &self.name, self.core.entry_id);
        MessageStream {
            rx: self.core.messages.subscribe(),
            attachment,
        }
    }

    /// Attaches a consumer of connection state.
    ///
    /// The first item is the current state, followed by every later
    /// transition. On a disposed channel the stream yields `Disconnected`
    /// and ends.
    #[must_use = "dropping the stream detaches it immediately"]
    pub fn state(&self) -> StateStream {
        let attachment = Attachment::new(&self.registry, &self.name, self.core.entry_id);
        StateStream {
            rx: self.core.state.observe(),
            attachment,
        }
    }
}

/// One reference on a registry entry. Detaching is idempotent.
struct Attachment {
    registry: Weak<RegistryShared>,
    name: ChannelName,
    entry_id: u64,
    attached: bool,
}

impl Attachment {
    fn new(registry: &Weak<RegistryShared>, name: &ChannelName, entry_id: u64) -> Self {
        let attached = registry
            .upgrade()
            .is_some_and(|registry| registry.attach(name, entry_id));
        if attached {
            ChannelMetrics::consumer_attached(name.kind());
        }
        Self {
            registry: Weak::clone(registry),
            name: name.clone(),
            entry_id,
            attached,
        }
    }

    fn detach(&mut self) {
        if !std::mem::take(&mut self.attached) {
            return;
        }
        ChannelMetrics::consumer_detached(self.name.kind());
        if let Some(registry) = self.registry.upgrade() {
            registry.detach(&self.name, self.entry_id);
        }
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Decoded messages of a channel, for one consumer.
pub struct MessageStream<M> {
    rx: mpsc::UnboundedReceiver<Delivery<M>>,
    attachment: Attachment,
}

impl<M> MessageStream<M> {
    /// Receives the next message, or `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<Result<M, ChannelError>> {
        self.rx.recv().await
    }

    /// Returns true while this stream holds a reference on its channel.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attachment.attached
    }

    /// Stops delivery and releases this consumer's reference.
    ///
    /// Messages already queued can still be read. Calling `detach` again, or
    /// dropping the stream afterwards, has no further effect.
    pub fn detach(&mut self) {
        self.rx.close();
        self.attachment.detach();
    }
}

impl<M> Unpin for MessageStream<M> {}

impl<M> Stream for MessageStream<M> {
    type Item = Result<M, ChannelError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl<M> fmt::Debug for MessageStream<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageStream")
            .field("channel", &self.attachment.name)
            .field("attached", &self.attachment.attached)
            .finish_non_exhaustive()
    }
}

/// Connection state transitions of a channel, for one consumer.
pub struct StateStream {
    rx: mpsc::UnboundedReceiver<ConnectionState>,
    attachment: Attachment,
}

impl StateStream {
    /// Receives the next state, or `None` once the channel has been disposed.
    pub async fn recv(&mut self) -> Option<ConnectionState> {
        self.rx.recv().await
    }

    /// Returns true while this stream holds a reference on its channel.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attachment.attached
    }

    /// Stops delivery and releases this consumer's reference.
    pub fn detach(&mut self) {
        self.rx.close();
        self.attachment.detach();
    }
}

impl Stream for StateStream {
    type Item = ConnectionState;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

impl fmt::Debug for StateStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateStream")
            .field("channel", &self.attachment.name)
            .field("attached", &self.attachment.attached)
            .finish_non_exhaustive()
    }
}
