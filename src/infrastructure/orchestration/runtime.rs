//! Relay runtime lifecycle.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use crate::application::state::RelayStatus;
use crate::error::Result;
use crate::infrastructure::bootstrap::{
    build_messenger, build_relay, build_store, start_command_worker,
};
use crate::infrastructure::bus::create_bus;
use crate::infrastructure::config::settings::Config;

/// Run until Ctrl-C.
pub async fn run(config: Config) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });
    run_with_shutdown(config, shutdown_rx).await
}

/// Run with an externally controlled shutdown signal.
///
/// Returns an error if the bus gives up for good; a requested shutdown
/// returns `Ok`.
pub async fn run_with_shutdown(config: Config, shutdown: watch::Receiver<bool>) -> Result<()> {
    info!(
        redis = %config.bus.display_url(),
        channels = ?config.bus.channels,
        "Starting arbrelay"
    );

    let status = Arc::new(RelayStatus::new());
    let store = build_store(&config);

    let setup = build_messenger(&config)?;
    let command_worker =
        start_command_worker(&config, &setup, Arc::clone(&store), Arc::clone(&status));

    let bus = create_bus(&config, Arc::clone(&status));
    let mut relay = build_relay(
        &config,
        bus,
        Arc::clone(&setup.messenger),
        Arc::clone(&store),
        status,
    )?;

    let result = relay.run(shutdown).await;

    if let Some(worker) = command_worker {
        worker.abort();
        info!("Command listener stopped");
    }
    store.flush();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::testkit;

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.telegram.enabled = false;
        config.store.ephemeral = true;
        config.bus.host = "127.0.0.1".into();
        config.bus.port = 1;
        config.bus.connect_timeout_ms = 200;
        config.reconnection = testkit::config::reconnection();
        config.reconnection.max_retries = Some(2);
        config
    }

    #[tokio::test]
    async fn test_unreachable_bus_gives_up_after_retries() {
        let (_tx, rx) = watch::channel(false);

        let result = run_with_shutdown(offline_config(), rx).await;

        assert!(matches!(result, Err(Error::Connection(_))));
    }

    #[tokio::test]
    async fn test_shutdown_before_bus_heals() {
        let mut config = offline_config();
        config.reconnection.max_retries = None;
        let (tx, rx) = watch::channel(false);

        let run = tokio::spawn(run_with_shutdown(config, rx));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        tx.send(true).unwrap();

        assert!(run.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_connecting() {
        let mut config = offline_config();
        config.telegram.enabled = true;
        config.telegram.bot_token = None;
        let (_tx, rx) = watch::channel(false);

        let result = run_with_shutdown(config, rx).await;

        if cfg!(feature = "telegram") {
            assert!(matches!(result, Err(Error::Config(_))));
        } else {
            assert!(matches!(result, Err(Error::Connection(_))));
        }
    }
}
