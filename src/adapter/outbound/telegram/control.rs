//! Subscription commands executed on behalf of a chat.

use std::sync::Arc;

use tracing::info;

use super::command::{command_help, parse_command, CommandParseError, TelegramCommand};
use crate::application::state::RelayStatus;
use crate::domain::SubscriberId;
use crate::port::inbound::subscription::SubscriptionControl;

/// Turns bot commands into subscriber store mutations and reply text.
#[derive(Clone)]
pub struct SubscriptionCommands {
    control: Arc<dyn SubscriptionControl>,
    status: Arc<RelayStatus>,
}

impl SubscriptionCommands {
    #[must_use]
    pub fn new(control: Arc<dyn SubscriptionControl>, status: Arc<RelayStatus>) -> Self {
        Self { control, status }
    }

    /// Reply for an incoming message, or `None` when it is not a command.
    #[must_use]
    pub fn response_for_message(&self, text: &str, chat: SubscriberId) -> Option<String> {
        match parse_command(text) {
            Ok(command) => Some(self.execute(command, chat)),
            Err(CommandParseError::NotACommand) => None,
            Err(err) => Some(format!("Invalid command: {err}\n\n{}", command_help())),
        }
    }

    /// Execute a parsed command for `chat`.
    #[must_use]
    pub fn execute(&self, command: TelegramCommand, chat: SubscriberId) -> String {
        match command {
            TelegramCommand::Start => {
                if self.control.subscribe(chat) {
                    info!(chat_id = %chat, "Chat subscribed");
                    format!(
                        "🤖 Welcome to Arbitrage Opportunities Bot!\n\n\
                        You will now receive arbitrage opportunities as they are detected.\n\n{}",
                        command_help()
                    )
                } else {
                    format!("✅ You are already subscribed.\n\n{}", command_help())
                }
            }
            TelegramCommand::Stop => {
                if self.control.unsubscribe(chat) {
                    info!(chat_id = %chat, "Chat unsubscribed");
                    "👋 You have been unsubscribed from arbitrage alerts.\n\
                    Use /start to subscribe again."
                        .to_string()
                } else {
                    "You are not currently subscribed.\n\
                    Use /start to subscribe to arbitrage alerts."
                        .to_string()
                }
            }
            TelegramCommand::Status => {
                if self.control.is_subscribed(chat) {
                    format!(
                        "✅ You are subscribed to arbitrage alerts.\n\
                        Total subscribers: {}\n\
                        Relay: {}",
                        self.control.subscriber_count(),
                        self.status.state()
                    )
                } else {
                    "❌ You are not subscribed to arbitrage alerts.\n\
                    Use /start to subscribe."
                        .to_string()
                }
            }
            TelegramCommand::Help => command_help().to_string(),
        }
    }
}
