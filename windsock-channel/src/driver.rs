//! Connection driver: owns one streaming connection and keeps it alive.

use futures::StreamExt;
use parking_lot::Mutex;
use std::future::poll_fn;
use std::sync::Arc;
use std::task::Poll;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info, warn};
use windsock_core::error::{ChannelError, NetworkError};
use windsock_core::types::{ChannelName, RetryPolicy, TargetAddress};
use windsock_telemetry::metrics::ChannelMetrics;
use windsock_telemetry::spans::{channel_span, connection_span};

use crate::Payload;
use crate::fanout::Fanout;
use crate::state::{ConnectionState, StateTracker};
use crate::ws::{FrameStream, MessageCodec, Transport, WebSocketMessage};

/// Runs once when the driver gives up.
pub(crate) type ExhaustedHook = Box<dyn FnOnce() + Send>;

/// Type-erased stop control, held by the registry.
pub(crate) trait DriverControl: Send + Sync {
    /// Stops the driver; idempotent.
    fn stop(&self);
}

/// Drives one connection through connect, read, and reconnect with
/// exponential backoff.
///
/// The reconnect counter starts at zero, resets on every successful handshake
/// and grows by one per scheduled reconnect. Reconnect `n` waits
/// `base_delay * 2^n`. When the policy allows no further attempt the driver
/// sends a single [`ChannelError::RetriesExhausted`] to its consumers, runs
/// the exhaustion hook and stops.
pub(crate) struct ConnectionDriver<M> {
    shared: Arc<DriverShared<M>>,
}

struct DriverShared<M> {
    name: ChannelName,
    target: TargetAddress,
    policy: RetryPolicy,
    transport: Arc<dyn Transport>,
    codec: MessageCodec,
    state: Arc<StateTracker>,
    messages: Arc<Fanout<M>>,
    cancel: CancellationToken,
    /// Frames of the open connection; taken by `stop` to close the socket.
    connection: Mutex<Option<FrameStream>>,
    lifecycle: Mutex<Lifecycle>,
    on_exhausted: Mutex<Option<ExhaustedHook>>,
}

#[derive(Default)]
struct Lifecycle {
    task: Option<JoinHandle<()>>,
    stopped: bool,
}

impl<M: Payload> ConnectionDriver<M> {
    pub(crate) fn new(
        name: ChannelName,
        target: TargetAddress,
        policy: RetryPolicy,
        transport: Arc<dyn Transport>,
        state: Arc<StateTracker>,
        messages: Arc<Fanout<M>>,
    ) -> Self {
        Self {
            shared: Arc::new(DriverShared {
                name,
                target,
                policy,
                transport,
                codec: MessageCodec::new(),
                state,
                messages,
                cancel: CancellationToken::new(),
                connection: Mutex::new(None),
                lifecycle: Mutex::new(Lifecycle::default()),
                on_exhausted: Mutex::new(None),
            }),
        }
    }

    /// Sets the hook run when the retry policy is exhausted.
    pub(crate) fn on_exhausted(&self, hook: impl FnOnce() + Send + 'static) {
        *self.shared.on_exhausted.lock() = Some(Box::new(hook));
    }

    /// Spawns the connection task on the current Tokio runtime.
    ///
    /// Calling `start` on a running or stopped driver does nothing.
    pub(crate) fn start(&self) -> Result<(), ChannelError> {
        let mut lifecycle = self.shared.lifecycle.lock();
        if lifecycle.task.is_some() || lifecycle.stopped {
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| ChannelError::NoRuntime {
            name: self.shared.name.to_string(),
        })?;
        let span = channel_span(self.shared.name.as_str(), self.shared.target.as_str());
        let shared = Arc::clone(&self.shared);
        lifecycle.task = Some(runtime.spawn(shared.run().instrument(span)));
        Ok(())
    }

    /// Cancels any pending reconnect, closes the connection and ends the
    /// state and message streams.
    pub(crate) fn stop(&self) {
        self.shared.stop();
    }

    #[cfg(test)]
    fn is_stopped(&self) -> bool {
        self.shared.lifecycle.lock().stopped
    }
}

impl<M: Payload> DriverControl for ConnectionDriver<M> {
    fn stop(&self) {
        self.shared.stop();
    }
}

impl<M: Payload> DriverShared<M> {
    async fn run(self: Arc<Self>) {
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!(channel = %self.name, "Connection task cancelled");
            }
            () = self.connect_loop() => {}
        }
    }

    async fn connect_loop(&self) {
        let kind = self.name.kind();
        let mut attempt: u32 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return;
            }

            self.state.publish(ConnectionState::Connecting);
            ChannelMetrics::connection_attempt(kind);

            let connected = self
                .transport
                .connect(&self.target)
                .instrument(connection_span(self.name.as_str(), attempt))
                .await;

            match connected {
                Ok(frames) => {
                    attempt = 0;
                    let _open = OpenConnection::new(kind);
                    self.state.publish(ConnectionState::Connected);
                    info!(channel = %self.name, target = %self.target, "Channel connected");

                    let dropped = self.pump(frames).await;
                    if self.cancel.is_cancelled() {
                        return;
                    }
                    match dropped {
                        Some(e) if e.is_recoverable() => {
                            warn!(channel = %self.name, error = %e, "Channel connection dropped");
                        }
                        Some(e) => {
                            error!(channel = %self.name, error = %e, "Channel connection failed");
                        }
                        None => warn!(channel = %self.name, "Channel connection closed by server"),
                    }
                }
                Err(e) if e.is_recoverable() => {
                    warn!(channel = %self.name, attempt, error = %e, "Channel handshake failed");
                }
                Err(e) => {
                    error!(
                        channel = %self.name,
                        attempt,
                        severity = %e.severity(),
                        error = %e,
                        "Channel handshake failed"
                    );
                }
            }

            ChannelMetrics::connection_failure(kind);
            self.state.publish(ConnectionState::Disconnected);

            if self.cancel.is_cancelled() {
                return;
            }
            if !self.policy.allows(attempt) {
                self.exhaust(attempt);
                return;
            }

            let delay = self.policy.delay_for(attempt);
            attempt = attempt.saturating_add(1);
            debug!(
                channel = %self.name,
                attempt,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                "Scheduling reconnect"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Reads frames until the connection goes away; returns the error, if any.
    ///
    /// The stream lives in `connection` while it is read, so `stop` can drop
    /// it from any thread.
    async fn pump(&self, frames: FrameStream) -> Option<NetworkError> {
        {
            let mut connection = self.connection.lock();
            if self.cancel.is_cancelled() {
                return None;
            }
            *connection = Some(frames);
        }

        let dropped = loop {
            let frame = poll_fn(|cx| match self.connection.lock().as_mut() {
                Some(frames) => frames.poll_next_unpin(cx),
                None => Poll::Ready(None),
            })
            .await;

            match frame {
                Some(Ok(frame)) => self.deliver(&frame),
                Some(Err(e)) => break Some(e),
                None => break None,
            }
        };
        drop(self.connection.lock().take());
        dropped
    }

    fn deliver(&self, frame: &WebSocketMessage) {
        let kind = self.name.kind();
        match self.codec.decode::<M>(frame) {
            Ok(message) => {
                ChannelMetrics::message_received(kind);
                self.messages.publish(&message);
            }
            Err(e) => {
                ChannelMetrics::decode_failure(kind);
                warn!(
                    channel = %self.name,
                    frame_len = frame.len(),
                    error = %e,
                    "Dropping frame that failed to decode"
                );
            }
        }
    }

    fn exhaust(&self, attempts: u32) {
        error!(
            channel = %self.name,
            target = %self.target,
            attempts,
            "Reconnect attempts exhausted, giving up"
        );
        ChannelMetrics::retries_exhausted(self.name.kind());
        self.messages.fail(&ChannelError::RetriesExhausted {
            name: self.name.to_string(),
            attempts,
        });

        let hook = self.on_exhausted.lock().take();
        if let Some(hook) = hook {
            hook();
        }
        self.stop();
    }

    fn stop(&self) {
        let task = {
            let mut lifecycle = self.lifecycle.lock();
            if lifecycle.stopped {
                return;
            }
            lifecycle.stopped = true;
            lifecycle.task.take()
        };

        self.cancel.cancel();
        let connection = self.connection.lock().take();
        drop(connection);
        if let Some(task) = task {
            task.abort();
        }
        self.state.finish(ConnectionState::Disconnected);
        self.messages.close();
        info!(channel = %self.name, "Channel driver stopped");
    }
}

/// Keeps the open-connections gauge balanced, including on cancellation.
struct OpenConnection<'a> {
    kind: &'a str,
}

impl<'a> OpenConnection<'a> {
    fn new(kind: &'a str) -> Self {
        ChannelMetrics::connection_opened(kind);
        Self { kind }
    }
}

impl Drop for OpenConnection<'_> {
    fn drop(&mut self) {
        ChannelMetrics::connection_closed(self.kind);
    }
}
