//! In-memory subscriber persistence.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::domain::SubscriberId;
use crate::error::Result;
use crate::port::outbound::persistence::SubscriberPersistence;

/// Keeps the last saved list in memory. Nothing survives the process.
#[derive(Default)]
pub struct MemoryBackend {
    subscribers: Mutex<Vec<SubscriberId>>,
    saves: AtomicUsize,
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a pre-populated list, as if loaded from an earlier run.
    #[must_use]
    pub fn with_subscribers(subscribers: Vec<SubscriberId>) -> Self {
        Self {
            subscribers: Mutex::new(subscribers),
            saves: AtomicUsize::new(0),
        }
    }

    /// Number of completed saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl SubscriberPersistence for MemoryBackend {
    fn load(&self) -> Result<Vec<SubscriberId>> {
        Ok(self.subscribers.lock().clone())
    }

    fn save(&self, subscribers: &[SubscriberId]) -> Result<()> {
        *self.subscribers.lock() = subscribers.to_vec();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
