//! Redis pub/sub event bus.
//!
//! `connect()` opens a dedicated pub/sub connection; `subscribe()` registers
//! the channels and turns the connection into a message stream. Each
//! `next_message()` waits at most one poll interval, so a quiet bus yields
//! [`BusMessage::Idle`] while a closed stream yields
//! [`BusMessage::Disconnected`].

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use redis::aio::PubSub;
use redis::Msg;
use tokio::time::timeout;
use tracing::{debug, info, trace};

use super::settings::RedisSettings;
use crate::domain::ChannelEvent;
use crate::error::{Error, Result};
use crate::port::outbound::bus::{BusMessage, EventBus};

type MessageStream = Pin<Box<dyn Stream<Item = Msg> + Send>>;

/// Connection lifecycle.
enum Connection {
    Closed,
    /// Connected, not yet subscribed.
    Open(PubSub),
    /// Subscribed and streaming messages.
    Streaming(MessageStream),
}

/// [`EventBus`] backed by a Redis pub/sub subscription.
pub struct RedisBus {
    settings: RedisSettings,
    connection: Connection,
}

impl RedisBus {
    #[must_use]
    pub fn new(settings: RedisSettings) -> Self {
        Self {
            settings,
            connection: Connection::Closed,
        }
    }

    fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.settings.connect_timeout_ms)
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.settings.poll_interval_ms)
    }
}

#[async_trait]
impl EventBus for RedisBus {
    async fn connect(&mut self) -> Result<()> {
        self.connection = Connection::Closed;

        let url = self.settings.display_url();
        info!(url = %url, "Connecting to Redis");

        let client = redis::Client::open(self.settings.connection_info())?;
        let pubsub = timeout(self.connect_timeout(), client.get_async_pubsub())
            .await
            .map_err(|_| {
                Error::Connection(format!(
                    "timed out connecting to {url} after {:?}",
                    self.connect_timeout()
                ))
            })??;

        info!(url = %url, "Redis connected");
        self.connection = Connection::Open(pubsub);
        Ok(())
    }

    async fn subscribe(&mut self, channels: &[String]) -> Result<()> {
        // A streaming connection can't take new subscriptions; start over.
        if !matches!(self.connection, Connection::Open(_)) {
            self.connect().await?;
        }

        let Connection::Open(mut pubsub) = std::mem::replace(&mut self.connection, Connection::Closed)
        else {
            return Err(Error::Connection("Redis connection not open".into()));
        };

        for channel in channels {
            pubsub.subscribe(channel).await?;
        }
        info!(channels = ?channels, "Subscribed to Redis channels");

        self.connection = Connection::Streaming(Box::pin(pubsub.into_on_message()));
        Ok(())
    }

    async fn next_message(&mut self) -> Option<BusMessage> {
        let poll_interval = self.poll_interval();
        let Connection::Streaming(stream) = &mut self.connection else {
            return Some(BusMessage::Disconnected {
                reason: "not subscribed".to_string(),
            });
        };

        match timeout(poll_interval, stream.next()).await {
            Err(_) => {
                trace!("No Redis message within poll interval");
                Some(BusMessage::Idle)
            }
            Ok(None) => {
                debug!("Redis message stream closed");
                self.connection = Connection::Closed;
                Some(BusMessage::Disconnected {
                    reason: "Redis connection closed".to_string(),
                })
            }
            Ok(Some(msg)) => {
                let channel = msg.get_channel_name().to_string();
                let payload = String::from_utf8_lossy(msg.get_payload_bytes()).into_owned();
                trace!(channel = %channel, bytes = payload.len(), "Redis message received");
                Some(BusMessage::Event(ChannelEvent::new(channel, payload)))
            }
        }
    }

    fn bus_name(&self) -> &'static str {
        "redis"
    }
}
