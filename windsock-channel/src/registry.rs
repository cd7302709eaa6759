//! Channel registry: one live connection per channel name.

use parking_lot::Mutex;
use serde::Serialize;
use std::any::{Any, type_name};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info};
use windsock_core::config::WindsockConfig;
use windsock_core::error::{ChannelError, WindsockError};
use windsock_core::types::{ChannelName, RetryPolicy, TargetAddress};
use windsock_telemetry::metrics::ChannelMetrics;

use crate::Payload;
use crate::address::AddressResolver;
use crate::driver::{ConnectionDriver, DriverControl};
use crate::fanout::Fanout;
use crate::handle::{ChannelCore, ChannelHandle};
use crate::request::ChannelRequest;
use crate::state::{ConnectionState, StateTracker};
use crate::ws::{Transport, WebSocketTransport};

/// Shares one connection per channel name between any number of consumers.
///
/// Acquiring a name that is already live joins the existing connection; the
/// first acquire creates the entry and starts its driver. An entry is removed
/// and its connection closed when the last consumer stream detaches, or when
/// its retry policy is exhausted. The next acquire of that name starts over
/// with a fresh connection.
///
/// The registry is cheap to clone; clones share the same table. Dropping the
/// last clone stops every live connection.
///
/// # Example
///
/// ```no_run
/// use windsock_channel::{ChannelRegistry, ChannelRequest};
/// use windsock_core::config::WindsockConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = ChannelRegistry::new(&WindsockConfig::default())?;
/// let handle = registry.acquire::<serde_json::Value>(
///     &ChannelRequest::new("market-depth:BTCUSDT:20", "/depth/BTCUSDT").retry_attempts(3),
/// )?;
///
/// let mut messages = handle.messages();
/// while let Some(message) = messages.recv().await {
///     println!("{}", message?);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ChannelRegistry {
    shared: Arc<RegistryShared>,
}

pub(crate) struct RegistryShared {
    transport: Arc<dyn Transport>,
    resolver: AddressResolver,
    defaults: RetryPolicy,
    entries: Mutex<HashMap<ChannelName, Entry>>,
    next_id: AtomicU64,
}

struct Entry {
    id: u64,
    target: TargetAddress,
    policy: RetryPolicy,
    payload_type: &'static str,
    ref_count: usize,
    state: Arc<StateTracker>,
    driver: Box<dyn DriverControl>,
    core: Arc<dyn Any + Send + Sync>,
}

/// Point-in-time view of a registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSnapshot {
    /// Channel name.
    pub name: ChannelName,
    /// Resolved streaming address.
    pub target: TargetAddress,
    /// Latest connection state.
    pub state: ConnectionState,
    /// Number of attached consumer streams.
    pub reference_count: usize,
    /// Reconnect limit; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl ChannelRegistry {
    /// Creates a registry that connects over WebSocket.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: &WindsockConfig) -> Result<Self, WindsockError> {
        Self::with_transport(config, Arc::new(WebSocketTransport::new(config.transport)))
    }

    /// Creates a registry over a custom transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn with_transport(
        config: &WindsockConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, WindsockError> {
        config.validate()?;
        let resolver = AddressResolver::new(&config.base_url)?;

        Ok(Self {
            shared: Arc::new(RegistryShared {
                transport,
                resolver,
                defaults: config.defaults.retry_policy(),
                entries: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        })
    }

    /// Returns the resolver used for request targets.
    #[must_use]
    pub fn resolver(&self) -> &AddressResolver {
        &self.shared.resolver
    }

    /// Returns a handle to the channel named in `request`, creating and
    /// connecting it if it is not live.
    ///
    /// Must be called from within a Tokio runtime. Conflicts are reported
    /// before any connection attempt is made.
    ///
    /// # Errors
    ///
    /// - `InvalidName` / `InvalidAddress` for a malformed request
    /// - `TargetConflict` if the name is live with a different target
    /// - `PayloadTypeMismatch` if the name is live with a different payload type
    /// - `NoRuntime` if no Tokio runtime is running
    pub fn acquire<M: Payload>(
        &self,
        request: &ChannelRequest,
    ) -> Result<ChannelHandle<M>, ChannelError> {
        let name = ChannelName::new(request.name())?;
        let target = self.shared.resolver.resolve(request.target())?;

        let mut entries = self.shared.entries.lock();
        if let Some(entry) = entries.get(&name) {
            let core = Self::join::<M>(&name, &target, entry)?;
            return Ok(ChannelHandle::new(
                name,
                target,
                core,
                Arc::downgrade(&self.shared),
            ));
        }

        let policy = request.retry_policy(self.shared.defaults);
        let entry_id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let state = Arc::new(StateTracker::new());
        let messages = Arc::new(Fanout::<M>::new());

        let driver = ConnectionDriver::new(
            name.clone(),
            target.clone(),
            policy,
            Arc::clone(&self.shared.transport),
            Arc::clone(&state),
            Arc::clone(&messages),
        );
        let registry = Arc::downgrade(&self.shared);
        let exhausted_name = name.clone();
        driver.on_exhausted(move || {
            if let Some(registry) = registry.upgrade() {
                registry.dispose(&exhausted_name, entry_id);
            }
        });
        driver.start()?;

        let core = Arc::new(ChannelCore {
            entry_id,
            messages,
            state: Arc::clone(&state),
        });
        let erased = Arc::clone(&core) as Arc<dyn Any + Send + Sync>;
        entries.insert(
            name.clone(),
            Entry {
                id: entry_id,
                target: target.clone(),
                policy,
                payload_type: type_name::<M>(),
                ref_count: 0,
                state,
                driver: Box::new(driver),
                core: erased,
            },
        );
        drop(entries);

        ChannelMetrics::channel_created(name.kind());
        info!(
            channel = %name,
            target = %target,
            max_attempts = ?policy.max_attempts,
            base_delay_ms = u64::try_from(policy.base_delay.as_millis()).unwrap_or(u64::MAX),
            "Channel created"
        );

        Ok(ChannelHandle::new(
            name,
            target,
            core,
            Arc::downgrade(&self.shared),
        ))
    }

    fn join<M: Payload>(
        name: &ChannelName,
        target: &TargetAddress,
        entry: &Entry,
    ) -> Result<Arc<ChannelCore<M>>, ChannelError> {
        if entry.target != *target {
            ChannelMetrics::channel_conflict(name.kind());
            error!(
                channel = %name,
                existing = %entry.target,
                requested = %target,
                "Channel is live with a different target"
            );
            return Err(ChannelError::TargetConflict {
                name: name.to_string(),
                existing: entry.target.to_string(),
                requested: target.to_string(),
            });
        }

        let core = Arc::clone(&entry.core)
            .downcast::<ChannelCore<M>>()
            .map_err(|_| {
                ChannelMetrics::channel_conflict(name.kind());
                error!(
                    channel = %name,
                    existing = entry.payload_type,
                    requested = type_name::<M>(),
                    "Channel is live with a different payload type"
                );
                ChannelError::PayloadTypeMismatch {
                    name: name.to_string(),
                    existing: entry.payload_type.to_string(),
                    requested: type_name::<M>().to_string(),
                }
            })?;

        debug!(
            channel = %name,
            reference_count = entry.ref_count,
            "Joining live channel"
        );
        debug_assert_eq!(core.entry_id, entry.id);
        Ok(core)
    }

    /// Returns true if `name` has a live entry.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.shared.entries.lock().contains_key(name)
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.entries.lock().len()
    }

    /// Returns true if no entry is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.entries.lock().is_empty()
    }

    /// Returns a snapshot of the entry for `name`, if live.
    #[must_use]
    pub fn snapshot(&self, name: &str) -> Option<ChannelSnapshot> {
        let entries = self.shared.entries.lock();
        entries
            .get_key_value(name)
            .map(|(name, entry)| entry.snapshot(name))
    }

    /// Returns snapshots of every live entry, ordered by name.
    #[must_use]
    pub fn snapshots(&self) -> Vec<ChannelSnapshot> {
        let mut snapshots: Vec<_> = self
            .shared
            .entries
            .lock()
            .iter()
            .map(|(name, entry)| entry.snapshot(name))
            .collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    /// Disposes every entry, stopping all connections.
    ///
    /// Attached streams end; handles stay usable but only yield finished
    /// streams. Later acquires start fresh entries.
    pub fn shutdown(&self) {
        let drained: Vec<_> = self.shared.entries.lock().drain().collect();
        for (name, entry) in drained {
            retire(&name, entry, "registry shutdown");
        }
    }
}

impl std::fmt::Debug for ChannelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRegistry")
            .field("base", &self.shared.resolver.base().as_str())
            .field("channels", &self.len())
            .finish_non_exhaustive()
    }
}

impl RegistryShared {
    /// Adds a reference to the entry if it is still the one `entry_id` names.
    pub(crate) fn attach(&self, name: &ChannelName, entry_id: u64) -> bool {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(name).filter(|entry| entry.id == entry_id) else {
            return false;
        };
        entry.ref_count += 1;
        debug!(
            channel = %name,
            reference_count = entry.ref_count,
            "Consumer attached"
        );
        true
    }

    /// Drops a reference; the last one disposes the entry.
    pub(crate) fn detach(&self, name: &ChannelName, entry_id: u64) {
        let removed = {
            let mut entries = self.entries.lock();
            Self::release(&mut entries, name, entry_id)
        };
        if let Some(entry) = removed {
            retire(name, entry, "last consumer detached");
        }
    }

    fn release(
        entries: &mut HashMap<ChannelName, Entry>,
        name: &ChannelName,
        entry_id: u64,
    ) -> Option<Entry> {
        let entry = entries.get_mut(name).filter(|entry| entry.id == entry_id)?;
        entry.ref_count = entry.ref_count.saturating_sub(1);
        debug!(
            channel = %name,
            reference_count = entry.ref_count,
            "Consumer detached"
        );
        if entry.ref_count > 0 {
            return None;
        }
        entries.remove(name)
    }

    /// Removes the entry regardless of its reference count.
    fn dispose(&self, name: &ChannelName, entry_id: u64) {
        let removed = {
            let mut entries = self.entries.lock();
            let current = entries.get(name).is_some_and(|entry| entry.id == entry_id);
            if current {
                entries.remove(name)
            } else {
                None
            }
        };
        if let Some(entry) = removed {
            retire(name, entry, "retries exhausted");
        }
    }
}

impl Drop for RegistryShared {
    fn drop(&mut self) {
        for (name, entry) in self.entries.get_mut().drain() {
            retire(&name, entry, "registry dropped");
        }
    }
}

impl Entry {
    fn snapshot(&self, name: &ChannelName) -> ChannelSnapshot {
        ChannelSnapshot {
            name: name.clone(),
            target: self.target.clone(),
            state: self.state.current(),
            reference_count: self.ref_count,
            max_attempts: self.policy.max_attempts,
        }
    }
}

fn retire(name: &ChannelName, entry: Entry, reason: &str) {
    entry.driver.stop();
    ChannelMetrics::channel_disposed(name.kind());
    info!(
        channel = %name,
        target = %entry.target,
        consumers = entry.ref_count,
        reason,
        "Channel disposed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedTransport, settle};
    use futures::StreamExt;
    use serde::Deserialize;
    use std::time::Duration;
    use windsock_core::config::ChannelDefaults;

    #[derive(Debug, Clone, PartialEq, Deserialize)]
    struct Level {
        price: f64,
    }

    fn registry(transport: &Arc<ScriptedTransport>) -> ChannelRegistry {
        let config = WindsockConfig {
            base_url: "http://feed.test/api/".to_string(),
            ..WindsockConfig::default()
        };
        ChannelRegistry::with_transport(&config, transport.clone()).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_connection_per_name() {
        let transport = ScriptedTransport::new();
        let server = transport.open_next();
        let registry = registry(&transport);
        let request = ChannelRequest::new("depth:BTC", "depth/BTC");

        let first = registry.acquire::<Level>(&request).unwrap();
        let second = registry.acquire::<Level>(&request).unwrap();
        let mut a = first.messages();
        let mut b = second.messages();
        settle().await;

        server.send_text(r#"{"price":1.5}"#);
        assert_eq!(a.recv().await, Some(Ok(Level { price: 1.5 })));
        assert_eq!(b.recv().await, Some(Ok(Level { price: 1.5 })));

        assert_eq!(transport.connect_count(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot("depth:BTC").unwrap().reference_count, 2);
        assert_eq!(
            transport.targets()[0].as_str(),
            "ws://feed.test/api/depth/BTC"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_target_conflict_rejected_without_connecting() {
        let transport = ScriptedTransport::new();
        let _server = transport.open_next();
        let registry = registry(&transport);

        let _live = registry
            .acquire::<Level>(&ChannelRequest::new("x", "ws://a.test/feed"))
            .unwrap();
        let result = registry.acquire::<Level>(&ChannelRequest::new("x", "ws://b.test/feed"));
        settle().await;

        assert!(matches!(
            result,
            Err(ChannelError::TargetConflict { ref existing, ref requested, .. })
                if existing == "ws://a.test/feed" && requested == "ws://b.test/feed"
        ));
        assert_eq!(transport.connect_count(), 1);
        assert_eq!(transport.targets()[0].as_str(), "ws://a.test/feed");
    }

    #[tokio::test(start_paused = true)]
    async fn test_payload_type_mismatch_rejected() {
        let transport = ScriptedTransport::new();
        let registry = registry(&transport);
        let request = ChannelRequest::new("x", "/feed");

        let _live = registry.acquire::<Level>(&request).unwrap();
        let result = registry.acquire::<serde_json::Value>(&request);
        assert!(matches!(
            result,
            Err(ChannelError::PayloadTypeMismatch { .. })
        ));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_requests_rejected() {
        let transport = ScriptedTransport::new();
        let registry = registry(&transport);

        assert!(matches!(
            registry.acquire::<Level>(&ChannelRequest::new("", "/feed")),
            Err(ChannelError::InvalidName { .. })
        ));
        assert!(matches!(
            registry.acquire::<Level>(&ChannelRequest::new("x", "ftp://host/feed")),
            Err(ChannelError::InvalidAddress { .. })
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_acquire_outside_runtime_fails() {
        let transport = ScriptedTransport::new();
        let registry = registry(&transport);

        let result = registry.acquire::<Level>(&ChannelRequest::new("x", "/feed"));
        assert!(matches!(result, Err(ChannelError::NoRuntime { .. })));
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_detach_disposes_entry() {
        let transport = ScriptedTransport::new();
        let server = transport.open_next();
        let registry = registry(&transport);
        let handle = registry
            .acquire::<Level>(&ChannelRequest::new("b", "/feed"))
            .unwrap();

        let streams: Vec<_> = (0..4).map(|_| handle.messages()).collect();
        let mut state = handle.state();
        settle().await;
        assert_eq!(registry.snapshot("b").unwrap().reference_count, 5);

        drop(streams);
        assert!(registry.contains("b"));
        assert_eq!(registry.snapshot("b").unwrap().reference_count, 1);
        assert_eq!(handle.current_state(), ConnectionState::Connected);
        assert!(!server.is_closed());

        state.detach();
        assert!(!registry.contains("b"));
        assert_eq!(handle.current_state(), ConnectionState::Disconnected);
        assert!(server.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_detach_is_idempotent() {
        let transport = ScriptedTransport::new();
        let _server = transport.open_next();
        let registry = registry(&transport);
        let handle = registry
            .acquire::<Level>(&ChannelRequest::new("c", "/feed"))
            .unwrap();

        let _keep = handle.messages();
        let mut stream = handle.messages();
        assert_eq!(registry.snapshot("c").unwrap().reference_count, 2);

        stream.detach();
        stream.detach();
        assert!(!stream.is_attached());
        drop(stream);
        assert_eq!(registry.snapshot("c").unwrap().reference_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_consumers_share_then_release() {
        let transport = ScriptedTransport::new();
        let server = transport.open_next();
        let registry = registry(&transport);
        let request = ChannelRequest::new("b", "/levels");

        let mut first = registry.acquire::<Level>(&request).unwrap().messages();
        let mut second = registry.acquire::<Level>(&request).unwrap().messages();
        settle().await;

        server.send_text(r#"{"price":10.0}"#);
        assert_eq!(first.recv().await, Some(Ok(Level { price: 10.0 })));
        assert_eq!(second.recv().await, Some(Ok(Level { price: 10.0 })));

        drop(first);
        assert!(registry.contains("b"));
        server.send_text(r#"{"price":11.0}"#);
        assert_eq!(second.recv().await, Some(Ok(Level { price: 11.0 })));

        drop(second);
        assert!(!registry.contains("b"));
        assert!(server.is_closed());
        assert_eq!(transport.connect_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_state_replays_to_late_consumer() {
        let transport = ScriptedTransport::new();
        let _server = transport.open_next();
        let registry = registry(&transport);
        let handle = registry
            .acquire::<Level>(&ChannelRequest::new("d", "/feed"))
            .unwrap();

        let _early = handle.messages();
        settle().await;

        let mut late = handle.state();
        assert_eq!(late.recv().await, Some(ConnectionState::Connected));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_disposes_and_allows_fresh_acquire() {
        let transport = ScriptedTransport::new();
        let registry = registry(&transport);
        let request = ChannelRequest::new("a", "/feed")
            .retry_attempts(3)
            .retry_base_delay(Duration::from_millis(100));

        let handle = registry.acquire::<Level>(&request).unwrap();
        let mut messages = handle.messages();
        let mut states = handle.state();

        let items: Vec<_> = (&mut messages).collect().await;
        assert_eq!(
            items,
            vec![Err(ChannelError::RetriesExhausted {
                name: "a".to_string(),
                attempts: 3,
            })]
        );
        assert_eq!(transport.connect_count(), 4);
        assert!(!registry.contains("a"));

        let mut last = None;
        while let Some(state) = states.recv().await {
            last = Some(state);
        }
        assert_eq!(last, Some(ConnectionState::Disconnected));

        // A stale handle cannot resurrect the disposed entry.
        let mut stale = handle.messages();
        assert!(!stale.is_attached());
        assert_eq!(stale.recv().await, None);
        assert!(!registry.contains("a"));

        let _server = transport.open_next();
        let fresh = registry.acquire::<Level>(&request).unwrap();
        let _attached = fresh.messages();
        settle().await;
        assert_eq!(transport.connect_count(), 5);
        assert_eq!(fresh.current_state(), ConnectionState::Connected);
        assert_eq!(registry.snapshot("a").unwrap().reference_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_detach_leaves_new_entry_alone() {
        let transport = ScriptedTransport::new();
        let registry = registry(&transport);
        let request = ChannelRequest::new("e", "/feed");

        let old = registry.acquire::<Level>(&request).unwrap();
        let mut old_stream = old.messages();
        let mut spare = old.messages();
        spare.detach();
        old_stream.detach();
        assert!(!registry.contains("e"));

        let new = registry.acquire::<Level>(&request).unwrap();
        let _new_stream = new.messages();
        drop(old_stream);
        drop(spare);
        assert_eq!(registry.snapshot("e").unwrap().reference_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disposed_handle_state_stream_is_finished() {
        let transport = ScriptedTransport::new();
        let registry = registry(&transport);
        let handle = registry
            .acquire::<Level>(&ChannelRequest::new("f", "/feed"))
            .unwrap();
        drop(handle.messages());
        assert!(!registry.contains("f"));

        let mut state = handle.state();
        assert!(!state.is_attached());
        assert_eq!(state.recv().await, Some(ConnectionState::Disconnected));
        assert_eq!(state.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unattached_handle_keeps_entry() {
        let transport = ScriptedTransport::new();
        let _server = transport.open_next();
        let registry = registry(&transport);

        let handle = registry
            .acquire::<Level>(&ChannelRequest::new("g", "/feed"))
            .unwrap();
        settle().await;
        assert!(registry.contains("g"));
        assert_eq!(registry.snapshot("g").unwrap().reference_count, 0);
        assert_eq!(handle.current_state(), ConnectionState::Connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_policy_comes_from_config() {
        let transport = ScriptedTransport::new();
        let config = WindsockConfig {
            defaults: ChannelDefaults {
                retry_attempts: Some(2),
                retry_base_delay_ms: 50,
            },
            ..WindsockConfig::default()
        };
        let registry = ChannelRegistry::with_transport(&config, transport.clone()).unwrap();

        let _handle = registry
            .acquire::<Level>(&ChannelRequest::new("h", "/feed"))
            .unwrap();
        assert_eq!(registry.snapshot("h").unwrap().max_attempts, Some(2));

        let _other = registry
            .acquire::<Level>(&ChannelRequest::new("i", "/feed").unbounded_retries())
            .unwrap();
        assert_eq!(registry.snapshot("i").unwrap().max_attempts, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_everything() {
        let transport = ScriptedTransport::new();
        let first_server = transport.open_next();
        let second_server = transport.open_next();
        let registry = registry(&transport);

        let one = registry
            .acquire::<Level>(&ChannelRequest::new("one", "/one"))
            .unwrap();
        let two = registry
            .acquire::<Level>(&ChannelRequest::new("two", "/two"))
            .unwrap();
        let mut one_stream = one.messages();
        let _two_stream = two.messages();
        settle().await;
        assert_eq!(
            registry
                .snapshots()
                .iter()
                .map(|s| s.name.as_str())
                .collect::<Vec<_>>(),
            vec!["one", "two"]
        );

        registry.shutdown();
        assert!(registry.is_empty());
        assert_eq!(one_stream.recv().await, None);
        assert_eq!(two.current_state(), ConnectionState::Disconnected);
        assert!(first_server.is_closed());
        assert!(second_server.is_closed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_registry_stops_connections() {
        let transport = ScriptedTransport::new();
        let server = transport.open_next();
        let registry = registry(&transport);

        let handle = registry
            .acquire::<Level>(&ChannelRequest::new("z", "/feed"))
            .unwrap();
        let mut stream = handle.messages();
        settle().await;

        drop(registry);
        assert!(server.is_closed());
        assert_eq!(stream.recv().await, None);
        drop(stream);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquire_shares_one_connection() {
        let transport = ScriptedTransport::new();
        let _server = transport.open_next();
        let registry = registry(&transport);

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let registry = registry.clone();
                tokio::spawn(async move {
                    let handle = registry
                        .acquire::<Level>(&ChannelRequest::new("shared", "/feed"))
                        .unwrap();
                    handle.messages()
                })
            })
            .collect();

        let mut streams = Vec::new();
        for task in tasks {
            streams.push(task.await.unwrap());
        }
        transport.wait_for_connects(1).await;

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.snapshot("shared").unwrap().reference_count, 16);
        assert_eq!(transport.connect_count(), 1);

        drop(streams);
        assert!(registry.is_empty());
    }
}
