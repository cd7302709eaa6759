//! Scripted transport for driver and registry tests.

use async_trait::async_trait;
use futures::StreamExt;
use futures::stream;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc};
use tokio::time::Instant;
use windsock_core::error::NetworkError;
use windsock_core::types::TargetAddress;

use crate::ws::{FrameStream, Transport, WebSocketMessage};

type FrameSender = mpsc::UnboundedSender<Result<WebSocketMessage, NetworkError>>;
type FrameReceiver = mpsc::UnboundedReceiver<Result<WebSocketMessage, NetworkError>>;

enum Step {
    Fail(NetworkError),
    Open(FrameReceiver),
}

/// Answers connects from a queue of scripted outcomes; an empty queue refuses.
pub(crate) struct ScriptedTransport {
    inner: Mutex<ScriptInner>,
    connected: Notify,
}

#[derive(Default)]
struct ScriptInner {
    script: VecDeque<Step>,
    connects: Vec<(TargetAddress, Instant)>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(ScriptInner::default()),
            connected: Notify::new(),
        })
    }

    /// Queues `count` refused handshakes.
    pub(crate) fn fail_next(&self, count: usize) {
        let mut inner = self.inner.lock();
        inner.script.extend((0..count).map(|_| Step::Fail(refused())));
    }

    /// Queues one handshake that fails with `error`.
    pub(crate) fn fail_next_with(&self, error: NetworkError) {
        self.inner.lock().script.push_back(Step::Fail(error));
    }

    /// Queues a successful handshake and returns the server side of it.
    pub(crate) fn open_next(&self) -> ServerConnection {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().script.push_back(Step::Open(rx));
        ServerConnection { tx }
    }

    pub(crate) fn connect_count(&self) -> usize {
        self.inner.lock().connects.len()
    }

    pub(crate) fn connect_times(&self) -> Vec<Instant> {
        self.inner.lock().connects.iter().map(|(_, at)| *at).collect()
    }

    pub(crate) fn targets(&self) -> Vec<TargetAddress> {
        self.inner
            .lock()
            .connects
            .iter()
            .map(|(target, _)| target.clone())
            .collect()
    }

    /// Waits until at least `count` connects have been made.
    pub(crate) async fn wait_for_connects(&self, count: usize) {
        loop {
            let notified = self.connected.notified();
            if self.connect_count() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&self, address: &TargetAddress) -> Result<FrameStream, NetworkError> {
        let step = {
            let mut inner = self.inner.lock();
            inner.connects.push((address.clone(), Instant::now()));
            inner.script.pop_front()
        };
        self.connected.notify_waiters();

        match step {
            Some(Step::Open(rx)) => Ok(stream::unfold(rx, |mut rx| async move {
                rx.recv().await.map(|frame| (frame, rx))
            })
            .boxed()),
            Some(Step::Fail(error)) => Err(error),
            None => Err(refused()),
        }
    }
}

fn refused() -> NetworkError {
    NetworkError::ConnectionFailed {
        reason: "connection refused".to_string(),
    }
}

/// Server end of a scripted connection. Dropping it closes the connection.
pub(crate) struct ServerConnection {
    tx: FrameSender,
}

impl ServerConnection {
    pub(crate) fn send_text(&self, text: &str) {
        let _ = self.tx.send(Ok(WebSocketMessage::text(text)));
    }

    /// Drops the connection with a transport error.
    pub(crate) fn fail(self, error: NetworkError) {
        let _ = self.tx.send(Err(error));
    }

    /// Returns true once the client side has gone away.
    pub(crate) fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Lets spawned tasks run without advancing the clock.
pub(crate) async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}
