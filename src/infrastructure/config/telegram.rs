//! Telegram bot configuration.

use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

/// Telegram bot configuration.
///
/// The token is normally supplied through `BOT_TOKEN` rather than the file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramAppConfig {
    /// Deliver broadcasts and answer commands through Telegram.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Publish the command list to the "/" menu on startup.
    #[serde(default = "default_true")]
    pub register_commands: bool,
    /// Bot API token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,
}

impl TelegramAppConfig {
    /// Configured token, ignoring blanks.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.bot_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

impl Default for TelegramAppConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            register_commands: default_true(),
            bot_token: None,
        }
    }
}
