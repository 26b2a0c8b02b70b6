//! Telegram bot integration.
//!
//! Outbound: [`TelegramMessenger`] delivers broadcasts through the Bot API.
//! Inbound: a command worker answers `/start`, `/stop`, `/status`, `/help`
//! by mutating the subscriber store.
//!
//! Requires the `telegram` feature to be enabled.

pub mod command;

pub mod control;
pub mod messenger;
pub mod worker;

pub use control::SubscriptionCommands;
pub use messenger::TelegramMessenger;
pub use worker::spawn_command_worker;
