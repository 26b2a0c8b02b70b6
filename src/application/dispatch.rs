//! Broadcast dispatcher.
//!
//! Scatter-gather delivery of one message to many subscribers. Every attempt
//! runs on its own future with its own timeout and error/panic capture, so a
//! failing recipient never aborts or delays the others beyond the bounded
//! concurrency window. All outcomes are collected before returning.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{stream, FutureExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::domain::{BroadcastReport, DeliveryOutcome, SubscriberId};
use crate::port::outbound::messenger::{DeliveryError, Messenger};

/// Delivery settings for broadcasts.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    /// Per-subscriber send timeout (milliseconds).
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
    /// Maximum deliveries in flight for one broadcast.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

const fn default_send_timeout_ms() -> u64 {
    5_000
}

const fn default_max_concurrency() -> usize {
    8
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            send_timeout_ms: default_send_timeout_ms(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Fans a message out to subscribers through a [`Messenger`].
pub struct BroadcastDispatcher {
    messenger: Arc<dyn Messenger>,
    send_timeout: Duration,
    max_concurrency: usize,
}

impl BroadcastDispatcher {
    /// Create a dispatcher over `messenger`.
    #[must_use]
    pub fn new(messenger: Arc<dyn Messenger>, config: &DeliveryConfig) -> Self {
        Self {
            messenger,
            send_timeout: Duration::from_millis(config.send_timeout_ms),
            max_concurrency: config.max_concurrency.max(1),
        }
    }

    /// Send `message` to every subscriber and report each outcome.
    ///
    /// Outcomes are listed in the same order as `subscribers`.
    pub async fn broadcast(&self, message: &str, subscribers: &[SubscriberId]) -> BroadcastReport {
        // Unordered so a hung head of the queue never holds back later sends.
        let mut indexed: Vec<(usize, SubscriberId, DeliveryOutcome)> =
            stream::iter(subscribers.iter().copied().enumerate())
                .map(|(index, subscriber)| async move {
                    (index, subscriber, self.deliver(subscriber, message).await)
                })
                .buffer_unordered(self.max_concurrency)
                .collect()
                .await;
        indexed.sort_unstable_by_key(|(index, _, _)| *index);

        let outcomes = indexed
            .into_iter()
            .map(|(_, subscriber, outcome)| (subscriber, outcome))
            .collect();

        let report = BroadcastReport::new(outcomes);
        info!(
            messenger = self.messenger.name(),
            targeted = report.len(),
            delivered = report.delivered(),
            soft_failures = report.soft_failures(),
            permanent_failures = report.permanent_failures().len(),
            "Broadcast complete"
        );
        report
    }

    /// One isolated delivery attempt.
    async fn deliver(&self, subscriber: SubscriberId, message: &str) -> DeliveryOutcome {
        let attempt = AssertUnwindSafe(self.messenger.send(subscriber, message)).catch_unwind();

        match timeout(self.send_timeout, attempt).await {
            Ok(Ok(Ok(()))) => {
                debug!(chat_id = %subscriber, "Message delivered");
                DeliveryOutcome::Delivered
            }
            Ok(Ok(Err(e))) => classify(subscriber, &e),
            Ok(Err(_panic)) => {
                error!(chat_id = %subscriber, "Messenger panicked during delivery");
                DeliveryOutcome::SoftFailure {
                    reason: "messenger panicked".to_string(),
                }
            }
            Err(_elapsed) => classify(subscriber, &DeliveryError::Timeout(self.send_timeout)),
        }
    }
}

fn classify(subscriber: SubscriberId, error: &DeliveryError) -> DeliveryOutcome {
    if error.is_permanent() {
        info!(chat_id = %subscriber, error = %error, "Subscriber unreachable");
        DeliveryOutcome::PermanentFailure {
            reason: error.to_string(),
        }
    } else {
        warn!(chat_id = %subscriber, error = %error, "Delivery failed, subscriber kept");
        DeliveryOutcome::SoftFailure {
            reason: error.to_string(),
        }
    }
}
