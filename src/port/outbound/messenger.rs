//! Messenger port for delivering chat messages.
//!
//! The messenger is the only interface to the outside messaging platform.
//! Its errors carry enough structure for the dispatcher to tell a dead
//! recipient from a transient hiccup.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::SubscriberId;

/// Delivery failure reported by a [`Messenger`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("recipient blocked the bot")]
    Blocked,

    #[error("chat not found")]
    ChatNotFound,

    #[error("recipient account is deactivated")]
    Deactivated,

    #[error("bot was removed from the chat")]
    Kicked,

    #[error("invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("network error: {0}")]
    Network(String),

    #[error("send timed out after {0:?}")]
    Timeout(Duration),

    #[error("delivery failed: {0}")]
    Other(String),
}

impl DeliveryError {
    /// True when the recipient can never be reached again.
    #[must_use]
    pub const fn is_permanent(&self) -> bool {
        matches!(
            self,
            Self::Blocked
                | Self::ChatNotFound
                | Self::Deactivated
                | Self::Kicked
                | Self::InvalidRecipient(_)
        )
    }
}

/// Sends one text message to one subscriber.
///
/// Implementations must be thread-safe (`Send + Sync`); the dispatcher calls
/// `send` for several subscribers concurrently.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Deliver `text` to `subscriber`.
    async fn send(&self, subscriber: SubscriberId, text: &str) -> Result<(), DeliveryError>;

    /// Messenger name for logging.
    fn name(&self) -> &'static str;
}

/// A messenger that only logs, used when no chat platform is configured.
pub struct LogMessenger;

#[async_trait]
impl Messenger for LogMessenger {
    async fn send(&self, subscriber: SubscriberId, text: &str) -> Result<(), DeliveryError> {
        tracing::info!(chat_id = %subscriber, chars = text.len(), "Message (log only)");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_classification() {
        assert!(DeliveryError::Blocked.is_permanent());
        assert!(DeliveryError::ChatNotFound.is_permanent());
        assert!(DeliveryError::Deactivated.is_permanent());
        assert!(DeliveryError::Kicked.is_permanent());
        assert!(DeliveryError::InvalidRecipient("bad".into()).is_permanent());
    }

    #[test]
    fn test_soft_classification() {
        assert!(!DeliveryError::RateLimited {
            retry_after_secs: 3
        }
        .is_permanent());
        assert!(!DeliveryError::Network("reset".into()).is_permanent());
        assert!(!DeliveryError::Timeout(Duration::from_secs(5)).is_permanent());
        assert!(!DeliveryError::Other("500".into()).is_permanent());
    }

    #[tokio::test]
    async fn test_log_messenger_always_succeeds() {
        let messenger = LogMessenger;
        assert!(messenger.send(SubscriberId::new(1), "hi").await.is_ok());
        assert_eq!(messenger.name(), "log");
    }
}
