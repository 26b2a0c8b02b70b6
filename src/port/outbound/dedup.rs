//! Event deduplication port.
//!
//! Defines the configuration and trait for suppressing repeated
//! `(channel, payload)` pairs inside a retention window.

use serde::{Deserialize, Serialize};

use crate::domain::ChannelEvent;

/// How two payloads are compared for equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupStrategy {
    /// Byte-for-byte payload comparison.
    Exact,

    /// Canonical JSON comparison (key order and whitespace ignored).
    ///
    /// Payloads that are not valid JSON fall back to exact comparison.
    #[default]
    Structural,
}

/// Configuration for event deduplication.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DedupConfig {
    /// Whether deduplication is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Payload equality granularity.
    #[serde(default)]
    pub strategy: DedupStrategy,

    /// Retention window in milliseconds, anchored on the first sighting.
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Maximum number of keys retained. Live keys are never evicted; once
    /// the cap is full of them, new keys are delivered without a record.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
}

const fn default_enabled() -> bool {
    true
}

const fn default_window_ms() -> u64 {
    300_000 // 5 minutes
}

const fn default_max_entries() -> usize {
    10_000
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            strategy: DedupStrategy::default(),
            window_ms: default_window_ms(),
            max_entries: default_max_entries(),
        }
    }
}

/// Port for filtering repeated bus events.
///
/// Called from the single event-processing path; implementations still
/// need to be `Send + Sync` because the relay is shared across tasks.
pub trait EventDeduplicator: Send + Sync {
    /// Check whether the event would be suppressed, without recording it.
    fn is_suppressed(&self, event: &ChannelEvent) -> bool;

    /// Check the event and record it if it is new.
    ///
    /// Returns `false` when an identical event was first seen less than one
    /// window ago. A suppressed sighting does not move the window.
    fn should_deliver(&self, event: &ChannelEvent) -> bool;

    /// Drop expired entries and enforce the size cap.
    fn gc(&self);

    /// Current number of retained keys.
    fn cache_size(&self) -> usize;
}
