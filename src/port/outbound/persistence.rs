//! Durable storage port for the subscriber list.

use crate::domain::SubscriberId;
use crate::error::Result;

/// Loads and saves the full subscriber set.
///
/// `save` replaces everything previously stored. Implementations must not
/// leave previously committed data corrupted when a write is interrupted.
pub trait SubscriberPersistence: Send + Sync {
    /// Load every persisted subscriber. An absent store loads as empty.
    fn load(&self) -> Result<Vec<SubscriberId>>;

    /// Replace the persisted set with `subscribers`.
    fn save(&self, subscribers: &[SubscriberId]) -> Result<()>;

    /// Where the data lives, for logging.
    fn location(&self) -> String;
}
