//! Message fan-out from one connection to many consumers.

use parking_lot::Mutex;
use tokio::sync::mpsc;
use windsock_core::error::ChannelError;

/// Item delivered to a consumer: a payload, or the terminal error.
pub(crate) type Delivery<M> = Result<M, ChannelError>;

/// Broadcasts decoded payloads to every current subscriber, in order.
///
/// Payloads are not retained; a late subscriber only sees what arrives after
/// it subscribed.
pub(crate) struct Fanout<M> {
    inner: Mutex<FanoutInner<M>>,
}

struct FanoutInner<M> {
    subscribers: Vec<mpsc::UnboundedSender<Delivery<M>>>,
    closed: bool,
}

impl<M: Clone> Fanout<M> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(FanoutInner {
                subscribers: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Adds a subscriber. On a closed fan-out the returned stream is already finished.
    pub(crate) fn subscribe(&self) -> mpsc::UnboundedReceiver<Delivery<M>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        if !inner.closed {
            inner.subscribers.push(tx);
        }
        rx
    }

    /// Delivers `message` to every live subscriber and returns how many got it.
    pub(crate) fn publish(&self, message: &M) -> usize {
        let mut inner = self.inner.lock();
        if inner.closed {
            return 0;
        }
        inner
            .subscribers
            .retain(|tx| tx.send(Ok(message.clone())).is_ok());
        inner.subscribers.len()
    }

    /// Delivers `error` to every subscriber, then closes.
    pub(crate) fn fail(&self, error: &ChannelError) {
        let mut inner = self.inner.lock();
        if inner.closed {
            return;
        }
        for tx in inner.subscribers.drain(..) {
            let _ = tx.send(Err(error.clone()));
        }
        inner.closed = true;
    }

    /// Ends every subscriber stream.
    pub(crate) fn close(&self) {
        let mut inner = self.inner.lock();
        inner.closed = true;
        inner.subscribers.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}
