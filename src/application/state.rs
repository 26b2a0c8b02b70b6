//! Shared relay state.
//!
//! [`RelayStatus`] is shared between the relay loop, the reconnecting bus and
//! the `/status` command. State transitions are logged; counters are plain
//! atomics read into a [`RelayStats`] snapshot.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::info;

/// Lifecycle state of the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelayState {
    Starting,
    Listening,
    Reconnecting,
    ShuttingDown,
    Stopped,
}

impl RelayState {
    /// Stable name used in logs and command output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Listening => "listening",
            Self::Reconnecting => "reconnecting",
            Self::ShuttingDown => "shutting_down",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time copy of the relay counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    pub events_received: u64,
    pub events_suppressed: u64,
    pub events_malformed: u64,
    pub broadcasts: u64,
    pub deliveries: u64,
    pub soft_failures: u64,
    pub subscribers_removed: u64,
    pub reconnects: u64,
}

/// State and counters shared across relay components.
pub struct RelayStatus {
    state: RwLock<RelayState>,
    started_at: DateTime<Utc>,
    events_received: AtomicU64,
    events_suppressed: AtomicU64,
    events_malformed: AtomicU64,
    broadcasts: AtomicU64,
    deliveries: AtomicU64,
    soft_failures: AtomicU64,
    subscribers_removed: AtomicU64,
    reconnects: AtomicU64,
}

impl Default for RelayStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayStatus {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RelayState::Starting),
            started_at: Utc::now(),
            events_received: AtomicU64::new(0),
            events_suppressed: AtomicU64::new(0),
            events_malformed: AtomicU64::new(0),
            broadcasts: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            soft_failures: AtomicU64::new(0),
            subscribers_removed: AtomicU64::new(0),
            reconnects: AtomicU64::new(0),
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RelayState {
        *self.state.read()
    }

    /// Move to `next`, logging the transition when the state changes.
    pub fn set_state(&self, next: RelayState) {
        let mut state = self.state.write();
        if *state != next {
            info!(from = %*state, to = %next, "Relay state changed");
            *state = next;
        }
    }

    /// When this status was created.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn record_received(&self) {
        self.events_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_suppressed(&self) {
        self.events_suppressed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_malformed(&self) {
        self.events_malformed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the result of one broadcast.
    pub fn record_broadcast(&self, delivered: usize, soft_failures: usize, removed: usize) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.deliveries.fetch_add(delivered as u64, Ordering::Relaxed);
        self.soft_failures
            .fetch_add(soft_failures as u64, Ordering::Relaxed);
        self.subscribers_removed
            .fetch_add(removed as u64, Ordering::Relaxed);
    }

    /// Snapshot of all counters.
    #[must_use]
    pub fn stats(&self) -> RelayStats {
        RelayStats {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_suppressed: self.events_suppressed.load(Ordering::Relaxed),
            events_malformed: self.events_malformed.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            soft_failures: self.soft_failures.load(Ordering::Relaxed),
            subscribers_removed: self.subscribers_removed.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
        }
    }
}
