//! Telegram Bot API messenger.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::{ApiError, RequestError};

use crate::adapter::outbound::markdown::MAX_MESSAGE_LEN;
use crate::domain::SubscriberId;
use crate::port::outbound::messenger::{DeliveryError, Messenger};

/// Sends broadcasts with `sendMessage` in MarkdownV2 parse mode.
#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Build a messenger from a bot token.
    #[must_use]
    pub fn from_token(token: &str) -> Self {
        Self::new(Bot::new(token))
    }

    /// Underlying bot handle, shared with the command worker.
    #[must_use]
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send(&self, subscriber: SubscriberId, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(ChatId(subscriber.get()), text)
            .parse_mode(ParseMode::MarkdownV2)
            .await
            .map(|_| ())
            .map_err(|e| classify_request_error(&e))
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}

/// Map a Bot API failure onto the delivery taxonomy.
pub fn classify_request_error(error: &RequestError) -> DeliveryError {
    match error {
        RequestError::Api(api) => classify_api_error(api),
        RequestError::MigrateToChatId(new_id) => {
            DeliveryError::InvalidRecipient(format!("chat migrated to {}", new_id.0))
        }
        RequestError::RetryAfter(after) => DeliveryError::RateLimited {
            retry_after_secs: u64::from(after.seconds()),
        },
        RequestError::Network(e) => DeliveryError::Network(e.to_string()),
        other => DeliveryError::Other(other.to_string()),
    }
}

fn classify_api_error(error: &ApiError) -> DeliveryError {
    match error {
        ApiError::BotBlocked => DeliveryError::Blocked,
        ApiError::ChatNotFound => DeliveryError::ChatNotFound,
        ApiError::UserDeactivated => DeliveryError::Deactivated,
        ApiError::BotKicked | ApiError::BotKickedFromSupergroup => DeliveryError::Kicked,
        ApiError::CantInitiateConversation
        | ApiError::CantTalkWithBots
        | ApiError::UserNotFound => DeliveryError::InvalidRecipient(error.to_string()),
        // The text is at fault, not the chat, so the subscriber stays.
        ApiError::MessageIsTooLong => DeliveryError::Other(format!(
            "message longer than {MAX_MESSAGE_LEN} characters was rejected"
        )),
        other => DeliveryError::Other(other.to_string()),
    }
}
