//! Inbound command listener.

use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::command::bot_commands;
use super::control::SubscriptionCommands;
use crate::domain::SubscriberId;

/// Spawn the long-polling command listener.
///
/// The returned handle never completes on its own; abort it on shutdown.
pub fn spawn_command_worker(
    bot: Bot,
    commands: SubscriptionCommands,
    register_commands: bool,
) -> JoinHandle<()> {
    tokio::spawn(command_worker(bot, commands, register_commands))
}

async fn command_worker(bot: Bot, commands: SubscriptionCommands, register_commands: bool) {
    // Makes the commands show up in the "/" menu
    if register_commands {
        if let Err(e) = register_bot_commands(&bot).await {
            warn!(error = %e, "Failed to register bot commands with Telegram");
        }
    }

    info!("Telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let commands = commands.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };

            let chat = SubscriberId::new(msg.chat.id.0);
            // Subscribe and unsubscribe write the store to disk.
            let text = text.to_string();
            let response =
                match tokio::task::spawn_blocking(move || commands.response_for_message(&text, chat))
                    .await
                {
                    Ok(response) => response,
                    Err(e) => {
                        error!(chat_id = %chat, error = %e, "Command handler task failed");
                        None
                    }
                };
            if let Some(response) = response {
                if let Err(e) = bot.send_message(msg.chat.id, response).await {
                    error!(chat_id = %chat, error = %e, "Failed to send command response");
                }
            }

            respond(())
        }
    })
    .await;

    warn!("Telegram command listener stopped");
}

async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}
