//! Connection state and the replaying state tracker.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Connection state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// A handshake is in flight.
    Connecting,
    /// The connection is open.
    Connected,
    /// No connection; waiting to retry, given up, or stopped.
    Disconnected,
}

impl ConnectionState {
    /// Returns true if the connection is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns the lowercase state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Holds the latest connection state and replays it to every new observer.
///
/// Each observer gets its own unbounded queue, so a slow reader sees every
/// transition rather than only the newest one. Publishing the value already
/// held is ignored. Once completed the tracker keeps its final value, new
/// observers receive just that value, and every observer stream ends.
#[derive(Debug)]
pub struct StateTracker {
    inner: Mutex<TrackerInner>,
}

#[derive(Debug)]
struct TrackerInner {
    current: ConnectionState,
    observers: Vec<mpsc::UnboundedSender<ConnectionState>>,
    completed: bool,
}

impl Default for StateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StateTracker {
    /// Creates a tracker whose initial state is `Connecting`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(TrackerInner {
                current: ConnectionState::Connecting,
                observers: Vec::new(),
                completed: false,
            }),
        }
    }

    /// Returns the latest state.
    #[must_use]
    pub fn current(&self) -> ConnectionState {
        self.inner.lock().current
    }

    /// Returns true once [`finish`](Self::finish) has run.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.inner.lock().completed
    }

    /// Returns the number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        let mut inner = self.inner.lock();
        inner.observers.retain(|tx| !tx.is_closed());
        inner.observers.len()
    }

    /// Registers an observer; the current state is queued before anything else.
    pub fn observe(&self) -> mpsc::UnboundedReceiver<ConnectionState> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.inner.lock();
        // The receiver is alive, so this send cannot fail.
        let _ = tx.send(inner.current);
        if !inner.completed {
            inner.observers.push(tx);
        }
        rx
    }

    /// Records a new state and forwards it to every observer.
    ///
    /// Returns false if the state was unchanged or the tracker is completed.
    pub fn publish(&self, state: ConnectionState) -> bool {
        let mut inner = self.inner.lock();
        Self::publish_locked(&mut inner, state)
    }

    /// Publishes a final state and completes in one step.
    pub fn finish(&self, state: ConnectionState) {
        let mut inner = self.inner.lock();
        Self::publish_locked(&mut inner, state);
        inner.completed = true;
        inner.observers.clear();
    }

    fn publish_locked(inner: &mut TrackerInner, state: ConnectionState) -> bool {
        if inner.completed || inner.current == state {
            return false;
        }
        inner.current = state;
        inner.observers.retain(|tx| tx.send(state).is_ok());
        true
    }
}
