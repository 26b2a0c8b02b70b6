//! Subscriber store.
//!
//! Owns the set of chat ids that receive broadcasts. Every mutation is
//! written through to the injected [`SubscriberPersistence`] backend while
//! holding a single writer lock, so the command worker and the relay loop
//! never interleave their writes. Readers get snapshot copies.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::domain::{BroadcastReport, SubscriberId};
use crate::port::inbound::subscription::SubscriptionControl;
use crate::port::outbound::persistence::SubscriberPersistence;

/// Persistent set of broadcast recipients.
///
/// Mutations write through to the backend on the calling thread. From async
/// code, run them with `tokio::task::spawn_blocking`.
pub struct SubscriberStore {
    subscribers: RwLock<HashSet<SubscriberId>>,
    /// Serializes mutate-then-persist sequences.
    writer: Mutex<()>,
    /// Set when the last write to the backend failed.
    dirty: AtomicBool,
    backend: Arc<dyn SubscriberPersistence>,
}

impl SubscriberStore {
    /// Open the store, loading whatever the backend holds.
    ///
    /// An unreadable or corrupt backend yields an empty store and a warning;
    /// startup never fails here.
    pub fn open(backend: Arc<dyn SubscriberPersistence>) -> Self {
        let subscribers: HashSet<SubscriberId> = match backend.load() {
            Ok(list) => list.into_iter().collect(),
            Err(e) => {
                warn!(
                    location = %backend.location(),
                    error = %e,
                    "Subscriber list unreadable, starting empty"
                );
                HashSet::new()
            }
        };

        info!(
            location = %backend.location(),
            subscribers = subscribers.len(),
            "Subscriber store loaded"
        );

        Self {
            subscribers: RwLock::new(subscribers),
            writer: Mutex::new(()),
            dirty: AtomicBool::new(false),
            backend,
        }
    }

    /// Add a subscriber. Returns `true` if it was newly added.
    pub fn add(&self, subscriber: SubscriberId) -> bool {
        let _writer = self.writer.lock();
        let added = self.subscribers.write().insert(subscriber);
        if added {
            self.persist();
        }
        added
    }

    /// Remove a subscriber. Returns `true` if it was present.
    pub fn remove(&self, subscriber: SubscriberId) -> bool {
        let _writer = self.writer.lock();
        let removed = self.subscribers.write().remove(&subscriber);
        if removed {
            self.persist();
        }
        removed
    }

    /// Membership test.
    #[must_use]
    pub fn contains(&self, subscriber: SubscriberId) -> bool {
        self.subscribers.read().contains(&subscriber)
    }

    /// Snapshot of all subscribers, sorted by id.
    #[must_use]
    pub fn all(&self) -> Vec<SubscriberId> {
        let mut snapshot: Vec<_> = self.subscribers.read().iter().copied().collect();
        snapshot.sort_unstable();
        snapshot
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// True when there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }

    /// Drop every subscriber whose delivery failed permanently.
    ///
    /// All removals happen in one mutation with a single persist. Returns the
    /// subscribers that were actually removed.
    pub fn apply_outcomes(&self, report: &BroadcastReport) -> Vec<SubscriberId> {
        let failed = report.permanent_failures();
        if failed.is_empty() {
            return Vec::new();
        }

        let _writer = self.writer.lock();
        let removed: Vec<SubscriberId> = {
            let mut subscribers = self.subscribers.write();
            failed
                .into_iter()
                .filter(|id| subscribers.remove(id))
                .collect()
        };

        if !removed.is_empty() {
            self.persist();
        }
        removed
    }

    /// Retry persistence if the last write failed.
    pub fn flush(&self) {
        if self.dirty.load(Ordering::Acquire) {
            let _writer = self.writer.lock();
            self.persist();
        }
    }

    /// Whether in-memory state is ahead of the backend.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Write the current set to the backend. Caller holds the writer lock.
    fn persist(&self) {
        let snapshot = self.all();
        match self.backend.save(&snapshot) {
            Ok(()) => self.dirty.store(false, Ordering::Release),
            Err(e) => {
                self.dirty.store(true, Ordering::Release);
                error!(
                    location = %self.backend.location(),
                    error = %e,
                    subscribers = snapshot.len(),
                    "Failed to persist subscriber list"
                );
            }
        }
    }
}

impl SubscriptionControl for SubscriberStore {
    fn subscribe(&self, subscriber: SubscriberId) -> bool {
        self.add(subscriber)
    }

    fn unsubscribe(&self, subscriber: SubscriberId) -> bool {
        self.remove(subscriber)
    }

    fn is_subscribed(&self, subscriber: SubscriberId) -> bool {
        self.contains(subscriber)
    }

    fn subscriber_count(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::store::memory::MemoryBackend;
    use crate::domain::DeliveryOutcome;
    use crate::error::Error;

    /// Backend that can be switched into a failing mode.
    struct FlakyBackend {
        inner: MemoryBackend,
        failing: AtomicBool,
    }

    impl FlakyBackend {
        fn new() -> Self {
            Self {
                inner: MemoryBackend::new(),
                failing: AtomicBool::new(false),
            }
        }
    }

    impl SubscriberPersistence for FlakyBackend {
        fn load(&self) -> crate::error::Result<Vec<SubscriberId>> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Store("corrupt".into()));
            }
            self.inner.load()
        }

        fn save(&self, subscribers: &[SubscriberId]) -> crate::error::Result<()> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(Error::Store("disk full".into()));
            }
            self.inner.save(subscribers)
        }

        fn location(&self) -> String {
            "flaky".into()
        }
    }

    fn id(raw: i64) -> SubscriberId {
        SubscriberId::new(raw)
    }

    fn store() -> (SubscriberStore, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (SubscriberStore::open(backend.clone()), backend)
    }

    #[test]
    fn test_add_is_idempotent() {
        let (store, _) = store();

        assert!(store.add(id(1)));
        assert!(!store.add(id(1)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (store, _) = store();
        store.add(id(1));

        assert!(store.remove(id(1)));
        assert!(!store.remove(id(1)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_all_reflects_net_set() {
        let (store, _) = store();
        for raw in [3, 1, 2, 1, 4] {
            store.add(id(raw));
        }
        store.remove(id(4));
        store.remove(id(9));
        store.add(id(4));
        store.remove(id(2));

        assert_eq!(store.all(), vec![id(1), id(3), id(4)]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let (store, _) = store();
        store.add(id(1));

        let snapshot = store.all();
        store.add(id(2));

        assert_eq!(snapshot, vec![id(1)]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_mutations_write_through() {
        let (store, backend) = store();
        store.add(id(5));
        store.add(id(6));
        store.remove(id(5));

        assert_eq!(backend.load().unwrap(), vec![id(6)]);
        assert_eq!(backend.save_count(), 3);
    }

    #[test]
    fn test_noop_mutations_do_not_persist() {
        let (store, backend) = store();
        store.add(id(5));
        store.add(id(5));
        store.remove(id(7));

        assert_eq!(backend.save_count(), 1);
    }

    #[test]
    fn test_reload_from_backend() {
        let backend = Arc::new(MemoryBackend::with_subscribers(vec![id(10), id(20)]));
        let store = SubscriberStore::open(backend);

        assert!(store.contains(id(10)));
        assert!(store.contains(id(20)));
    }

    #[test]
    fn test_unreadable_backend_opens_empty() {
        let backend = Arc::new(FlakyBackend::new());
        backend.failing.store(true, Ordering::SeqCst);

        let store = SubscriberStore::open(backend);
        assert!(store.is_empty());
    }

    #[test]
    fn test_failed_write_keeps_memory_and_retries() {
        let backend = Arc::new(FlakyBackend::new());
        let store = SubscriberStore::open(backend.clone());

        backend.failing.store(true, Ordering::SeqCst);
        assert!(store.add(id(1)));
        assert!(store.contains(id(1)));
        assert!(store.is_dirty());

        backend.failing.store(false, Ordering::SeqCst);
        store.flush();
        assert!(!store.is_dirty());
        assert_eq!(backend.inner.load().unwrap(), vec![id(1)]);
    }

    #[test]
    fn test_apply_outcomes_removes_only_permanent_failures() {
        let (store, backend) = store();
        for raw in [1, 2, 3] {
            store.add(id(raw));
        }
        let saves_before = backend.save_count();

        let report = BroadcastReport::new(vec![
            (id(1), DeliveryOutcome::Delivered),
            (
                id(2),
                DeliveryOutcome::PermanentFailure {
                    reason: "blocked".into(),
                },
            ),
            (
                id(3),
                DeliveryOutcome::SoftFailure {
                    reason: "timeout".into(),
                },
            ),
        ]);

        let removed = store.apply_outcomes(&report);

        assert_eq!(removed, vec![id(2)]);
        assert_eq!(store.all(), vec![id(1), id(3)]);
        assert_eq!(backend.save_count(), saves_before + 1);
    }

    #[test]
    fn test_apply_outcomes_skips_already_removed() {
        let (store, backend) = store();
        store.add(id(1));
        store.remove(id(1));
        let saves_before = backend.save_count();

        let report = BroadcastReport::new(vec![(
            id(1),
            DeliveryOutcome::PermanentFailure {
                reason: "chat not found".into(),
            },
        )]);

        assert!(store.apply_outcomes(&report).is_empty());
        assert_eq!(backend.save_count(), saves_before);
    }

    #[test]
    fn test_concurrent_writers_serialize() {
        let (store, backend) = store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        store.add(id(t * 100 + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 400);
        assert_eq!(backend.load().unwrap().len(), 400);
    }
}
