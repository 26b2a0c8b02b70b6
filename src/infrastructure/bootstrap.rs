//! Infrastructure bootstrap helpers for runtime wiring.

use std::sync::Arc;

use crate::adapter::outbound::markdown::MarkdownFormatter;
use crate::adapter::outbound::store::{JsonFileBackend, MemoryBackend};
use crate::application::dedup::Deduplicator;
use crate::application::state::RelayStatus;
use crate::application::{Relay, SubscriberStore};
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::bus::EventBus;
use crate::port::outbound::messenger::{LogMessenger, Messenger};
use crate::port::outbound::persistence::SubscriberPersistence;

#[cfg(feature = "telegram")]
use crate::adapter::outbound::telegram::{
    spawn_command_worker, SubscriptionCommands, TelegramMessenger,
};
#[cfg(feature = "telegram")]
use crate::error::ConfigError;
#[cfg(feature = "telegram")]
use tracing::info;

/// Messenger chosen from configuration.
pub struct MessengerSetup {
    pub messenger: Arc<dyn Messenger>,
    /// Bot handle for the command worker, when Telegram is active.
    #[cfg(feature = "telegram")]
    pub bot: Option<teloxide::Bot>,
}

/// Persistence backend for the configured store.
#[must_use]
pub fn build_persistence(config: &Config) -> Arc<dyn SubscriberPersistence> {
    if config.store.ephemeral {
        Arc::new(MemoryBackend::new())
    } else {
        Arc::new(JsonFileBackend::new(config.store.path.clone()))
    }
}

/// Open the subscriber store, loading any persisted subscribers.
#[must_use]
pub fn build_store(config: &Config) -> Arc<SubscriberStore> {
    Arc::new(SubscriberStore::open(build_persistence(config)))
}

/// Pick the outbound messenger.
///
/// # Errors
///
/// Returns [`ConfigError::MissingField`] when Telegram is enabled without a token.
#[cfg(feature = "telegram")]
#[allow(clippy::result_large_err)]
pub fn build_messenger(config: &Config) -> Result<MessengerSetup> {
    if !config.telegram.enabled {
        info!("Telegram disabled, broadcasts will only be logged");
        return Ok(MessengerSetup {
            messenger: Arc::new(LogMessenger),
            bot: None,
        });
    }

    let token = config
        .telegram
        .token()
        .ok_or(ConfigError::MissingField { field: "BOT_TOKEN" })?;
    let messenger = TelegramMessenger::from_token(token);
    let bot = messenger.bot().clone();
    info!("Telegram messenger enabled");

    Ok(MessengerSetup {
        messenger: Arc::new(messenger),
        bot: Some(bot),
    })
}

/// Pick the outbound messenger (non-telegram variant).
#[cfg(not(feature = "telegram"))]
#[allow(clippy::result_large_err)]
pub fn build_messenger(config: &Config) -> Result<MessengerSetup> {
    if config.telegram.enabled {
        tracing::warn!("Built without the telegram feature, broadcasts will only be logged");
    }
    Ok(MessengerSetup {
        messenger: Arc::new(LogMessenger),
    })
}

/// Start the bot command listener if Telegram is active.
#[cfg(feature = "telegram")]
pub fn start_command_worker(
    config: &Config,
    setup: &MessengerSetup,
    store: Arc<SubscriberStore>,
    status: Arc<RelayStatus>,
) -> Option<tokio::task::JoinHandle<()>> {
    let bot = setup.bot.clone()?;
    let commands = SubscriptionCommands::new(store, status);
    Some(spawn_command_worker(
        bot,
        commands,
        config.telegram.register_commands,
    ))
}

/// Start the bot command listener (non-telegram variant).
#[cfg(not(feature = "telegram"))]
pub fn start_command_worker(
    _config: &Config,
    _setup: &MessengerSetup,
    _store: Arc<SubscriberStore>,
    _status: Arc<RelayStatus>,
) -> Option<tokio::task::JoinHandle<()>> {
    None
}

/// Assemble the relay from its collaborators.
#[allow(clippy::result_large_err)]
pub fn build_relay(
    config: &Config,
    bus: Box<dyn EventBus>,
    messenger: Arc<dyn Messenger>,
    store: Arc<SubscriberStore>,
    status: Arc<RelayStatus>,
) -> Result<Relay> {
    Relay::builder()
        .bus(bus)
        .channels(config.bus.channels.clone())
        .dedup(Arc::new(Deduplicator::new(&config.dedup)))
        .formatter(Arc::new(MarkdownFormatter::new()))
        .messenger(messenger)
        .delivery(config.delivery.clone())
        .store(store)
        .status(status)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubscriberId;
    use crate::testkit::bus::ScriptedBus;

    fn config(toml: &str) -> Config {
        Config::parse_with_env(toml, |_| None).unwrap()
    }

    #[test]
    fn test_ephemeral_store_uses_memory() {
        let persistence = build_persistence(&config("[store]\nephemeral = true"));
        assert_eq!(persistence.location(), "memory");
    }

    #[test]
    fn test_file_store_uses_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("subs.json");
        let config = config(&format!("[store]\npath = {:?}", path.display().to_string()));

        let store = build_store(&config);
        store.add(SubscriberId::new(9));

        assert!(path.exists());
    }

    #[test]
    fn test_disabled_telegram_logs_only() {
        let setup = build_messenger(&config("[telegram]\nenabled = false")).unwrap();
        assert_eq!(setup.messenger.name(), "log");
    }

    #[cfg(feature = "telegram")]
    #[test]
    fn test_enabled_telegram_requires_token() {
        assert!(build_messenger(&config("[telegram]\nenabled = true")).is_err());
    }

    #[cfg(feature = "telegram")]
    #[test]
    fn test_enabled_telegram_with_token() {
        let setup =
            build_messenger(&config("[telegram]\nbot_token = \"123:abc\"")).unwrap();
        assert_eq!(setup.messenger.name(), "telegram");
        assert!(setup.bot.is_some());
    }

    #[test]
    fn test_build_relay() {
        let config = config("[store]\nephemeral = true\n[telegram]\nenabled = false");
        let status = Arc::new(RelayStatus::new());
        let relay = build_relay(
            &config,
            Box::new(ScriptedBus::new()),
            Arc::new(LogMessenger),
            build_store(&config),
            status.clone(),
        )
        .unwrap();

        assert!(Arc::ptr_eq(&relay.status(), &status));
    }
}
