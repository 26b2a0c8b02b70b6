//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.

use crate::application::dispatch::DeliveryConfig;
use crate::infrastructure::config::reconnection::ReconnectionConfig;
use crate::port::outbound::dedup::{DedupConfig, DedupStrategy};

/// Fast reconnection config with zero delays, unbounded retries.
pub fn reconnection() -> ReconnectionConfig {
    ReconnectionConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        backoff_multiplier: 1.0,
        max_consecutive_failures: 3,
        circuit_breaker_cooldown_ms: 0,
        max_retries: None,
    }
}

/// Structural dedup with a one-minute window.
pub fn dedup() -> DedupConfig {
    DedupConfig {
        enabled: true,
        strategy: DedupStrategy::Structural,
        window_ms: 60_000,
        max_entries: 1_000,
    }
}

/// Short send timeout so hanging messengers fail quickly.
pub fn delivery() -> DeliveryConfig {
    DeliveryConfig {
        send_timeout_ms: 100,
        max_concurrency: 4,
    }
}
