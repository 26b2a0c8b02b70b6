//! Telegram command parsing.

/// Supported bot commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TelegramCommand {
    Start,
    Stop,
    Status,
    Help,
}

/// Parse error for Telegram command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
}

impl std::fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a Telegram message into a bot command.
pub fn parse_command(text: &str) -> Result<TelegramCommand, CommandParseError> {
    let Some(raw_command) = text.split_whitespace().next() else {
        return Err(CommandParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/start" | "/subscribe" => Ok(TelegramCommand::Start),
        "/stop" | "/unsubscribe" => Ok(TelegramCommand::Stop),
        "/status" => Ok(TelegramCommand::Status),
        "/help" => Ok(TelegramCommand::Help),
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Command list shown in welcome and help replies.
#[must_use]
pub const fn command_help() -> &'static str {
    "Commands:\n\
    /start - Subscribe to arbitrage alerts\n\
    /stop - Unsubscribe from alerts\n\
    /status - Check subscription status\n\
    /help - Show this message"
}

/// Bot commands for Telegram menu registration.
///
/// Returns tuples of (command, description) for `set_my_commands`.
#[must_use]
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("start", "Subscribe to arbitrage alerts"),
        ("stop", "Unsubscribe from alerts"),
        ("status", "Check subscription status"),
        ("help", "Show all commands"),
    ]
}
