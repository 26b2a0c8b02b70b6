//! Relay orchestrator.
//!
//! Pulls events from the bus one at a time and runs each through the
//! pipeline: dedup check, formatting, dedup record, broadcast, and finally
//! pruning of subscribers that can no longer be reached. The next event is
//! not pulled until the current one is fully processed.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use super::dedup::Deduplicator;
use super::dispatch::{BroadcastDispatcher, DeliveryConfig};
use super::state::{RelayState, RelayStatus};
use super::subscriber::SubscriberStore;
use crate::domain::{BroadcastReport, ChannelEvent, SubscriberId};
use crate::error::{ConfigError, Error, Result};
use crate::port::outbound::bus::{BusMessage, EventBus};
use crate::port::outbound::dedup::{DedupConfig, EventDeduplicator};
use crate::port::outbound::formatter::MessageFormatter;
use crate::port::outbound::messenger::Messenger;

/// What happened to one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// Seen inside the dedup window; nothing sent.
    Suppressed,
    /// Payload could not be formatted; dropped without a dedup record.
    Malformed,
    /// Formatted and recorded, but nobody is subscribed.
    NoSubscribers,
    /// Sent to every subscriber.
    Broadcast(BroadcastReport),
}

/// The relay pipeline bound to one bus.
pub struct Relay {
    bus: Box<dyn EventBus>,
    channels: Vec<String>,
    pipeline: Pipeline,
}

/// Everything except the bus. Shared by reference while a broadcast is in
/// flight, so it must stay `Sync`.
struct Pipeline {
    dedup: Arc<dyn EventDeduplicator>,
    formatter: Arc<dyn MessageFormatter>,
    dispatcher: BroadcastDispatcher,
    store: Arc<SubscriberStore>,
    status: Arc<RelayStatus>,
}

impl Relay {
    /// Start building a relay.
    #[must_use]
    pub fn builder() -> RelayBuilder {
        RelayBuilder::default()
    }

    /// Shared status handle.
    #[must_use]
    pub fn status(&self) -> Arc<RelayStatus> {
        Arc::clone(&self.pipeline.status)
    }

    /// Run one event through the pipeline.
    pub async fn process_event(&self, event: &ChannelEvent) -> ProcessOutcome {
        self.pipeline.process(event).await
    }

    /// Drive the relay until shutdown is signalled or the bus ends.
    ///
    /// A bus that ends on its own (reconnect retries exhausted) is reported
    /// as an error; a requested shutdown returns `Ok`.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        self.pipeline.status.set_state(RelayState::Starting);

        if let Err(e) = self.bus.connect().await {
            warn!(bus = self.bus.bus_name(), error = %e, "Initial bus connection failed");
        }
        if let Err(e) = self.bus.subscribe(&self.channels).await {
            warn!(bus = self.bus.bus_name(), error = %e, "Initial subscribe failed");
        }

        info!(
            bus = self.bus.bus_name(),
            channels = ?self.channels,
            subscribers = self.pipeline.store.len(),
            "Relay listening"
        );
        self.pipeline.status.set_state(RelayState::Listening);

        let mut bus_ended = false;
        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    match result {
                        Ok(()) => {
                            if *shutdown.borrow() {
                                info!("Shutdown signal received");
                                break;
                            }
                        }
                        Err(_) => {
                            info!("Shutdown channel closed");
                            break;
                        }
                    }
                }
                message = self.bus.next_message() => {
                    match message {
                        Some(BusMessage::Event(event)) => {
                            self.pipeline.status.set_state(RelayState::Listening);
                            self.pipeline.process(&event).await;
                        }
                        Some(BusMessage::Idle) => {
                            self.pipeline.status.set_state(RelayState::Listening);
                            self.pipeline.flush_store().await;
                        }
                        Some(BusMessage::Disconnected { reason }) => {
                            warn!(reason = %reason, "Bus connection lost");
                            self.pipeline.status.set_state(RelayState::Reconnecting);
                        }
                        None => {
                            warn!(bus = self.bus.bus_name(), "Event bus ended");
                            bus_ended = true;
                            break;
                        }
                    }
                }
            }
        }

        self.pipeline.status.set_state(RelayState::ShuttingDown);
        self.pipeline.flush_store().await;
        self.pipeline.status.set_state(RelayState::Stopped);

        let stats = self.pipeline.status.stats();
        info!(
            events = stats.events_received,
            broadcasts = stats.broadcasts,
            deliveries = stats.deliveries,
            removed = stats.subscribers_removed,
            "Relay stopped"
        );

        if bus_ended {
            return Err(Error::Connection("event bus closed".into()));
        }
        Ok(())
    }
}

impl Pipeline {
    async fn process(&self, event: &ChannelEvent) -> ProcessOutcome {
        self.status.record_received();

        if self.dedup.is_suppressed(event) {
            self.status.record_suppressed();
            debug!(channel = event.channel(), "Duplicate event suppressed");
            return ProcessOutcome::Suppressed;
        }

        let message = match self.formatter.format(event) {
            Ok(message) => message,
            Err(e) => {
                self.status.record_malformed();
                warn!(
                    channel = event.channel(),
                    error = %e,
                    "Dropping malformed payload"
                );
                return ProcessOutcome::Malformed;
            }
        };

        if !self.dedup.should_deliver(event) {
            self.status.record_suppressed();
            return ProcessOutcome::Suppressed;
        }

        let subscribers = self.store.all();
        if subscribers.is_empty() {
            debug!(channel = event.channel(), "No subscribers, event not sent");
            return ProcessOutcome::NoSubscribers;
        }

        let report = self.dispatcher.broadcast(&message, &subscribers).await;

        let removed = self.prune(&report).await;
        for subscriber in &removed {
            info!(chat_id = %subscriber, "Removed unreachable subscriber");
        }

        self.status
            .record_broadcast(report.delivered(), report.soft_failures(), removed.len());

        ProcessOutcome::Broadcast(report)
    }

    /// Drop permanently failed subscribers. The store writes to disk, so the
    /// work runs on the blocking pool.
    async fn prune(&self, report: &BroadcastReport) -> Vec<SubscriberId> {
        if report.permanent_failures().is_empty() {
            return Vec::new();
        }

        let store = Arc::clone(&self.store);
        let report = report.clone();
        match tokio::task::spawn_blocking(move || store.apply_outcomes(&report)).await {
            Ok(removed) => removed,
            Err(e) => {
                error!(error = %e, "Subscriber pruning task failed");
                Vec::new()
            }
        }
    }

    /// Retry a failed store write off the async workers.
    async fn flush_store(&self) {
        if !self.store.is_dirty() {
            return;
        }

        let store = Arc::clone(&self.store);
        if let Err(e) = tokio::task::spawn_blocking(move || store.flush()).await {
            error!(error = %e, "Subscriber flush task failed");
        }
    }
}

/// Builder for [`Relay`].
///
/// Bus, messenger, formatter, and store are required; everything else has a
/// default.
#[derive(Default)]
pub struct RelayBuilder {
    bus: Option<Box<dyn EventBus>>,
    channels: Vec<String>,
    dedup: Option<Arc<dyn EventDeduplicator>>,
    formatter: Option<Arc<dyn MessageFormatter>>,
    messenger: Option<Arc<dyn Messenger>>,
    delivery: DeliveryConfig,
    store: Option<Arc<SubscriberStore>>,
    status: Option<Arc<RelayStatus>>,
}

impl RelayBuilder {
    #[must_use]
    pub fn bus(mut self, bus: impl EventBus + 'static) -> Self {
        self.bus = Some(Box::new(bus));
        self
    }

    #[must_use]
    pub fn channels(mut self, channels: Vec<String>) -> Self {
        self.channels = channels;
        self
    }

    #[must_use]
    pub fn dedup(mut self, dedup: Arc<dyn EventDeduplicator>) -> Self {
        self.dedup = Some(dedup);
        self
    }

    #[must_use]
    pub fn formatter(mut self, formatter: Arc<dyn MessageFormatter>) -> Self {
        self.formatter = Some(formatter);
        self
    }

    #[must_use]
    pub fn messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    #[must_use]
    pub fn delivery(mut self, delivery: DeliveryConfig) -> Self {
        self.delivery = delivery;
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<SubscriberStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn status(mut self, status: Arc<RelayStatus>) -> Self {
        self.status = Some(status);
        self
    }

    /// Assemble the relay.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required part is unset.
    pub fn build(self) -> Result<Relay> {
        let bus = self.bus.ok_or(ConfigError::MissingField { field: "bus" })?;
        let formatter = self
            .formatter
            .ok_or(ConfigError::MissingField { field: "formatter" })?;
        let messenger = self
            .messenger
            .ok_or(ConfigError::MissingField { field: "messenger" })?;
        let store = self
            .store
            .ok_or(ConfigError::MissingField { field: "store" })?;

        Ok(Relay {
            bus,
            channels: self.channels,
            pipeline: Pipeline {
                dedup: self
                    .dedup
                    .unwrap_or_else(|| Arc::new(Deduplicator::new(&DedupConfig::default()))),
                formatter,
                dispatcher: BroadcastDispatcher::new(messenger, &self.delivery),
                store,
                status: self.status.unwrap_or_default(),
            },
        })
    }
}
