//! Subscription management used by command handlers.

use crate::domain::SubscriberId;

/// Subscribe/unsubscribe/status operations backed by the subscriber store.
pub trait SubscriptionControl: Send + Sync {
    /// Register a subscriber. Returns `true` if it was not subscribed before.
    fn subscribe(&self, subscriber: SubscriberId) -> bool;

    /// Remove a subscriber. Returns `true` if it was subscribed.
    fn unsubscribe(&self, subscriber: SubscriberId) -> bool;

    /// Whether the subscriber currently receives broadcasts.
    fn is_subscribed(&self, subscriber: SubscriberId) -> bool;

    /// Total number of subscribers.
    fn subscriber_count(&self) -> usize;
}
