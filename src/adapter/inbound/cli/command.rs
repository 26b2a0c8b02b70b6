//! Command-line interface definitions.
//!
//! Defines the CLI structure for arbrelay using `clap`: running the relay,
//! managing configuration and subscribers, checking connectivity, and
//! publishing test payloads.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::paths;

/// Relay arbitrage events from Redis pub/sub to Telegram subscribers
#[derive(Parser, Debug)]
#[command(name = "arbrelay")]
#[command(version)]
pub struct Cli {
    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the arbrelay CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the relay (foreground)
    Run(RunArgs),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Inspect and edit the subscriber list
    #[command(subcommand)]
    Subscribers(SubscribersCommand),

    /// Run connectivity checks
    #[command(subcommand)]
    Check(CheckCommand),

    /// Publish a payload to the bus
    Publish(PublishArgs),
}

/// Subcommands for `arbrelay config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Generate a new configuration file from template.
    Init(ConfigInitArgs),
    /// Display the effective configuration with defaults applied.
    Show(ConfigPathArg),
    /// Validate a configuration file for correctness.
    Validate(ConfigPathArg),
}

/// Subcommands for `arbrelay subscribers`.
///
/// These edit the persisted list directly; a running relay picks the
/// changes up on its next start.
#[derive(Subcommand, Debug)]
pub enum SubscribersCommand {
    /// List subscribed chat ids.
    List(ConfigPathArg),
    /// Add a chat id.
    Add(SubscriberArgs),
    /// Remove a chat id.
    Remove(SubscriberArgs),
}

/// Subcommands for `arbrelay check`.
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Ping the Redis server.
    Bus(ConfigPathArg),
    /// Verify the bot token against the Telegram API.
    Telegram(ConfigPathArg),
}

/// Shared argument struct for commands that require only a configuration path.
#[derive(Args, Debug)]
pub struct ConfigPathArg {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for `config init`.
#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the configuration file.
    #[arg(default_value_os_t = paths::default_config())]
    pub path: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Keep subscribers in memory only.
    #[arg(long)]
    pub ephemeral: bool,

    /// Override the log level (e.g. debug, info).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit logs as JSON.
    #[arg(long)]
    pub json_logs: bool,
}

/// Arguments for `subscribers add` and `subscribers remove`.
#[derive(Args, Debug)]
pub struct SubscriberArgs {
    /// Telegram chat id (negative for groups).
    #[arg(allow_negative_numbers = true)]
    pub chat_id: i64,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}

/// Arguments for the `publish` subcommand.
#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("source").required(true).args(["payload", "samples"])))]
pub struct PublishArgs {
    /// JSON payload to publish.
    pub payload: Option<String>,

    /// Publish the built-in sample opportunities instead.
    #[arg(long)]
    pub samples: bool,

    /// Channel to publish on (defaults to the first configured channel).
    #[arg(long)]
    pub channel: Option<String>,

    /// Seconds to wait between samples.
    #[arg(long, default_value = "2")]
    pub interval: u64,

    /// Path to the configuration file.
    #[arg(short, long, default_value_os_t = paths::default_config())]
    pub config: PathBuf,
}
