//! Window-based event deduplication.
//!
//! Implements [`EventDeduplicator`] with a concurrent map from dedup key to
//! the instant the key was first seen. The window is anchored on that first
//! sighting: repeats inside the window are suppressed without extending it,
//! so a payload that keeps recurring is let through once per window.

use std::borrow::Cow;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::warn;

use crate::domain::ChannelEvent;
use crate::port::outbound::dedup::{DedupConfig, DedupStrategy, EventDeduplicator};

/// Deduplicator keyed on `(channel, normalized payload)`.
pub struct Deduplicator {
    /// First-sighting instant per key.
    cache: DashMap<String, Instant>,
    /// Last time expired entries were swept.
    last_sweep: Mutex<Instant>,
    window: Duration,
    max_entries: usize,
    strategy: DedupStrategy,
    enabled: bool,
}

impl Deduplicator {
    /// Create a new deduplicator from configuration.
    #[must_use]
    pub fn new(config: &DedupConfig) -> Self {
        Self {
            cache: DashMap::new(),
            last_sweep: Mutex::new(Instant::now()),
            window: Duration::from_millis(config.window_ms),
            max_entries: config.max_entries,
            strategy: config.strategy,
            enabled: config.enabled,
        }
    }

    /// Build the dedup key for an event.
    fn make_key(&self, event: &ChannelEvent) -> String {
        let payload = match self.strategy {
            DedupStrategy::Exact => Cow::Borrowed(event.payload()),
            DedupStrategy::Structural => normalize_json(event.payload()),
        };
        format!("{}\u{0}{}", event.channel(), payload)
    }

    fn is_live(&self, first_seen: Instant, now: Instant) -> bool {
        now.duration_since(first_seen) < self.window
    }

    /// Sweep expired entries at most once per window.
    fn maybe_sweep(&self, now: Instant) {
        let mut last = self.last_sweep.lock();
        if now.duration_since(*last) >= self.window {
            *last = now;
            drop(last);
            self.gc();
        }
    }

    /// Record a new key when the cache is full.
    ///
    /// Expired entries are swept first. If every retained key is still
    /// live, the new key is delivered but not recorded.
    fn record_over_cap(&self, key: String, now: Instant) {
        *self.last_sweep.lock() = now;
        self.gc();

        if self.cache.len() < self.max_entries {
            self.cache.insert(key, now);
        } else {
            warn!(
                max_entries = self.max_entries,
                "Dedup cache full of live entries, new event not recorded"
            );
        }
    }
}

impl EventDeduplicator for Deduplicator {
    fn is_suppressed(&self, event: &ChannelEvent) -> bool {
        if !self.enabled {
            return false;
        }

        let key = self.make_key(event);
        let now = Instant::now();
        self.cache
            .get(&key)
            .is_some_and(|first_seen| self.is_live(*first_seen, now))
    }

    fn should_deliver(&self, event: &ChannelEvent) -> bool {
        if !self.enabled {
            return true;
        }

        let key = self.make_key(event);
        let now = Instant::now();

        // Map guards must be released before anything touches the whole map.
        let refreshed = self.cache.get_mut(&key).map(|mut first_seen| {
            if self.is_live(*first_seen, now) {
                false
            } else {
                *first_seen = now;
                true
            }
        });

        match refreshed {
            Some(false) => return false,
            Some(true) => {}
            None if self.cache.len() < self.max_entries => {
                self.cache.insert(key, now);
            }
            None => self.record_over_cap(key, now),
        }

        self.maybe_sweep(now);
        true
    }

    fn gc(&self) {
        let now = Instant::now();
        let window = self.window;

        // Live entries are never evicted, even past the cap.
        self.cache
            .retain(|_, first_seen| now.duration_since(*first_seen) < window);
    }

    fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

/// Canonical JSON text with object keys sorted; non-JSON passes through.
fn normalize_json(payload: &str) -> Cow<'_, str> {
    match serde_json::from_str::<Value>(payload) {
        Ok(value) => Cow::Owned(canonicalize(value).to_string()),
        Err(_) => Cow::Borrowed(payload),
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, canonicalize(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}
