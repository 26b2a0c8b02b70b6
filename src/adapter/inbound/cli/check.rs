//! Connectivity check handlers.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{config, output};
use crate::adapter::outbound::redis::publisher;
use crate::error::Result;

/// Ping the configured Redis server.
pub async fn execute_bus(config_path: &Path) -> Result<()> {
    let config = config::load(config_path)?;
    let url = config.bus.display_url();

    output::section("Bus Check");
    output::action("Connecting", &url);
    let reply = publisher::ping(&config.bus).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "check.bus",
            "url": url,
            "reply": reply,
            "channels": config.bus.channels,
        }));
        return Ok(());
    }

    output::action_done("Connected", &url);
    output::field("Reply", reply);
    output::field("Channels", config.bus.channels.join(", "));
    Ok(())
}

/// Verify the bot token with `getMe`.
#[cfg(feature = "telegram")]
pub async fn execute_telegram(config_path: &Path) -> Result<()> {
    use teloxide::prelude::*;

    use crate::error::ConfigError;

    let config = config::load(config_path)?;
    let token = config
        .telegram
        .token()
        .ok_or(ConfigError::MissingField { field: "BOT_TOKEN" })?;

    output::section("Telegram Check");
    output::action("Authenticating", "bot token");
    let me = Bot::new(token).get_me().await?;
    let username = me.username.clone().unwrap_or_default();

    if output::is_json() {
        output::json_output(json!({
            "command": "check.telegram",
            "bot_id": me.id.0,
            "username": username,
        }));
        return Ok(());
    }

    output::action_done("Authenticated", "bot token");
    output::field("Bot", format!("@{username}"));
    output::hint("send /start to the bot to subscribe");
    Ok(())
}

/// Verify the bot token (non-telegram variant).
#[cfg(not(feature = "telegram"))]
pub async fn execute_telegram(_config_path: &Path) -> Result<()> {
    Err(crate::error::ConfigError::InvalidValue {
        field: "telegram",
        reason: "built without the telegram feature".to_string(),
    }
    .into())
}
