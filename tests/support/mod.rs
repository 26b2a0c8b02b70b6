#![allow(dead_code)]

use std::sync::Arc;

use arbrelay::adapter::outbound::markdown::MarkdownFormatter;
use arbrelay::adapter::outbound::store::MemoryBackend;
use arbrelay::application::dedup::Deduplicator;
use arbrelay::application::{Relay, SubscriberStore};
use arbrelay::domain::SubscriberId;
use arbrelay::port::outbound::bus::EventBus;
use arbrelay::port::outbound::dedup::DedupConfig;
use arbrelay::testkit;
use arbrelay::testkit::messenger::ScriptedMessenger;

pub const CHANNEL: &str = "arbitrage-trade-execution";
pub const PAYLOAD: &str = r#"{"exchange":"binance","pair":"btc-usdt","price":43250.75}"#;

pub fn id(raw: i64) -> SubscriberId {
    SubscriberId::new(raw)
}

pub fn ids(raw: &[i64]) -> Vec<SubscriberId> {
    raw.iter().copied().map(id).collect()
}

/// Store over a memory backend pre-loaded with `raw`.
pub fn memory_store(raw: &[i64]) -> (Arc<SubscriberStore>, Arc<MemoryBackend>) {
    let backend = Arc::new(MemoryBackend::with_subscribers(ids(raw)));
    let store = Arc::new(SubscriberStore::open(backend.clone()));
    (store, backend)
}

pub fn relay_with_dedup(
    bus: impl EventBus + 'static,
    messenger: &ScriptedMessenger,
    store: Arc<SubscriberStore>,
    dedup: DedupConfig,
) -> Relay {
    Relay::builder()
        .bus(bus)
        .channels(vec![CHANNEL.to_string()])
        .dedup(Arc::new(Deduplicator::new(&dedup)))
        .formatter(Arc::new(MarkdownFormatter::new()))
        .messenger(Arc::new(messenger.clone()))
        .delivery(testkit::config::delivery())
        .store(store)
        .build()
        .expect("relay builds")
}

pub fn relay(
    bus: impl EventBus + 'static,
    messenger: &ScriptedMessenger,
    store: Arc<SubscriberStore>,
) -> Relay {
    relay_with_dedup(bus, messenger, store, testkit::config::dedup())
}

/// Run `relay` over a channel bus, publish `events` in order, then close the
/// bus and wait for the relay to drain and stop.
pub async fn run_to_end(
    messenger: &ScriptedMessenger,
    store: Arc<SubscriberStore>,
    dedup: DedupConfig,
    events: &[(&str, &str)],
) -> arbrelay::error::Result<()> {
    let (bus, handle) = arbrelay::testkit::bus::ChannelBus::new(16);
    let mut relay = relay_with_dedup(bus, messenger, store, dedup);
    let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    let task = tokio::spawn(async move { relay.run(shutdown_rx).await });
    for (channel, payload) in events {
        handle.publish(channel, payload).await;
    }
    drop(handle);

    task.await.expect("relay task panicked")
}
