//! Event bus port.
//!
//! A bus connection yields raw channel payloads. Implementations must keep
//! "nothing arrived yet" ([`BusMessage::Idle`]) distinct from "the connection
//! is gone" ([`BusMessage::Disconnected`]) so that reconnect logic only kicks
//! in for the latter.

use async_trait::async_trait;

use crate::domain::ChannelEvent;
use crate::error::Result;

/// One poll result from a bus connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusMessage {
    /// A payload published on a subscribed channel.
    Event(ChannelEvent),
    /// No data arrived within the poll interval; the connection is healthy.
    Idle,
    /// The connection broke and must be re-established.
    Disconnected {
        /// Why the connection was lost.
        reason: String,
    },
}

/// Live subscription to a set of pub/sub channels.
#[async_trait]
pub trait EventBus: Send {
    /// Open a fresh connection, dropping any previous one.
    async fn connect(&mut self) -> Result<()>;

    /// Subscribe the current connection to `channels`.
    async fn subscribe(&mut self, channels: &[String]) -> Result<()>;

    /// Wait for the next message.
    ///
    /// Returns `None` once the bus will never yield again.
    async fn next_message(&mut self) -> Option<BusMessage>;

    /// Bus name for logging.
    fn bus_name(&self) -> &'static str;
}

#[async_trait]
impl EventBus for Box<dyn EventBus> {
    async fn connect(&mut self) -> Result<()> {
        (**self).connect().await
    }

    async fn subscribe(&mut self, channels: &[String]) -> Result<()> {
        (**self).subscribe(channels).await
    }

    async fn next_message(&mut self) -> Option<BusMessage> {
        (**self).next_message().await
    }

    fn bus_name(&self) -> &'static str {
        (**self).bus_name()
    }
}
