mod support;

use std::sync::Arc;

use arbrelay::application::{RelayState, RelayStatus};
use arbrelay::error::Error;
use arbrelay::infrastructure::bus::reconnecting::ReconnectingBus;
use arbrelay::infrastructure::config::reconnection::ReconnectionConfig;
use arbrelay::testkit;
use arbrelay::testkit::bus::{disconnect, event, ScriptedBus};
use arbrelay::testkit::messenger::ScriptedMessenger;
use tokio::sync::watch;

use support::{id, memory_store, CHANNEL, PAYLOAD};

fn limited(max_retries: u32) -> ReconnectionConfig {
    ReconnectionConfig {
        max_retries: Some(max_retries),
        ..testkit::config::reconnection()
    }
}

fn connection_error() -> arbrelay::error::Result<()> {
    Err(Error::Connection("connection refused".into()))
}

#[tokio::test]
async fn events_after_a_dropped_connection_are_delivered() {
    let inner = ScriptedBus::new()
        .with_connect_results(vec![Ok(()), Ok(()), connection_error(), connection_error()])
        .with_messages(vec![
            Some(event(CHANNEL, PAYLOAD)),
            Some(disconnect("server closed the connection")),
            Some(event(CHANNEL, r#"{"pair":"eth-usdt","price":3000}"#)),
        ]);
    let subscriptions = inner.subscriptions();
    let status = Arc::new(RelayStatus::new());
    let bus = ReconnectingBus::new(inner, limited(2)).with_status(status.clone());

    let messenger = ScriptedMessenger::new();
    let (store, _) = memory_store(&[111]);
    let mut relay = arbrelay::application::Relay::builder()
        .bus(bus)
        .channels(vec![CHANNEL.to_string()])
        .formatter(Arc::new(
            arbrelay::adapter::outbound::markdown::MarkdownFormatter::new(),
        ))
        .messenger(Arc::new(messenger.clone()))
        .delivery(testkit::config::delivery())
        .store(store)
        .status(status.clone())
        .build()
        .unwrap();
    let (_tx, rx) = watch::channel(false);

    let result = relay.run(rx).await;

    assert!(matches!(result, Err(Error::Connection(_))));
    assert_eq!(messenger.texts_for(id(111)).len(), 2);
    // Initial subscribe plus the resubscribe after the drop.
    let subscriptions = subscriptions.lock();
    assert_eq!(subscriptions.len(), 2);
    assert!(subscriptions.iter().all(|channels| channels == &[CHANNEL]));
    assert_eq!(status.stats().reconnects, 1);
    assert_eq!(status.state(), RelayState::Stopped);
}

#[tokio::test]
async fn unreachable_bus_at_startup_heals() {
    let inner = ScriptedBus::new()
        .with_connect_results(vec![connection_error(), Ok(()), connection_error()])
        .with_messages(vec![Some(event(CHANNEL, PAYLOAD))]);
    let (connects, subscribes) = inner.counts();
    let bus = ReconnectingBus::new(inner, limited(1));

    let messenger = ScriptedMessenger::new();
    let (store, _) = memory_store(&[111]);
    let mut relay = support::relay(bus, &messenger, store);
    let (_tx, rx) = watch::channel(false);

    relay.run(rx).await.unwrap_err();

    assert_eq!(messenger.delivered_count(), 1);
    assert_eq!(connects.load(std::sync::atomic::Ordering::SeqCst), 3);
    assert_eq!(subscribes.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[tokio::test]
async fn shutdown_interrupts_an_idle_bus() {
    let (bus, handle) = arbrelay::testkit::bus::ChannelBus::new(4);
    let bus = ReconnectingBus::new(bus, testkit::config::reconnection());
    let messenger = ScriptedMessenger::new();
    let (store, _) = memory_store(&[111]);
    let mut relay = support::relay(bus, &messenger, store);
    let (tx, rx) = watch::channel(false);

    let task = tokio::spawn(async move { relay.run(rx).await });
    handle.idle().await;
    handle.publish(CHANNEL, PAYLOAD).await;
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    tx.send(true).unwrap();

    assert!(task.await.unwrap().is_ok());
    assert_eq!(messenger.delivered_count(), 1);
    assert_eq!(handle.connect_count(), 1);
}
