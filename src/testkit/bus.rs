//! Mock [`EventBus`] implementations for testing.
//!
//! - [`ScriptedBus`] - Pre-loaded connect/subscribe results and messages.
//!   Best for: error handling, reconnection logic, retry behavior.
//!
//! - [`ChannelBus`] - Channel-backed bus with external control handle.
//!   Best for: integration tests needing on-demand event delivery.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::domain::ChannelEvent;
use crate::error::Result;
use crate::port::outbound::bus::{BusMessage, EventBus};

/// Build an event message.
pub fn event(channel: &str, payload: &str) -> BusMessage {
    BusMessage::Event(ChannelEvent::new(channel, payload))
}

/// Build a disconnect message.
pub fn disconnect(reason: &str) -> BusMessage {
    BusMessage::Disconnected {
        reason: reason.to_string(),
    }
}

// ---------------------------------------------------------------------------
// ScriptedBus
// ---------------------------------------------------------------------------

/// A mock bus with scripted connect/subscribe results and a fixed message queue.
///
/// Each call to `connect()` or `subscribe()` pops the next result from the
/// corresponding queue (defaults to `Ok(())` when exhausted). A `None` in the
/// message queue, or an exhausted queue, ends the stream.
pub struct ScriptedBus {
    connect_results: VecDeque<Result<()>>,
    subscribe_results: VecDeque<Result<()>>,
    messages: VecDeque<Option<BusMessage>>,
    connect_count: Arc<AtomicU32>,
    subscribe_count: Arc<AtomicU32>,
    subscriptions: Arc<Mutex<Vec<Vec<String>>>>,
}

impl ScriptedBus {
    pub fn new() -> Self {
        Self {
            connect_results: VecDeque::new(),
            subscribe_results: VecDeque::new(),
            messages: VecDeque::new(),
            connect_count: Arc::new(AtomicU32::new(0)),
            subscribe_count: Arc::new(AtomicU32::new(0)),
            subscriptions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_connect_results(mut self, results: Vec<Result<()>>) -> Self {
        self.connect_results = results.into();
        self
    }

    pub fn with_subscribe_results(mut self, results: Vec<Result<()>>) -> Self {
        self.subscribe_results = results.into();
        self
    }

    pub fn with_messages(mut self, messages: Vec<Option<BusMessage>>) -> Self {
        self.messages = messages.into();
        self
    }

    /// Get shared counters for asserting connect/subscribe call counts.
    pub fn counts(&self) -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        (self.connect_count.clone(), self.subscribe_count.clone())
    }

    /// Shared log of every channel list passed to `subscribe()`.
    pub fn subscriptions(&self) -> Arc<Mutex<Vec<Vec<String>>>> {
        self.subscriptions.clone()
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }

    pub fn subscribe_count(&self) -> u32 {
        self.subscribe_count.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for ScriptedBus {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.connect_results.pop_front().unwrap_or(Ok(()))
    }

    async fn subscribe(&mut self, channels: &[String]) -> Result<()> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        self.subscriptions.lock().push(channels.to_vec());
        self.subscribe_results.pop_front().unwrap_or(Ok(()))
    }

    async fn next_message(&mut self) -> Option<BusMessage> {
        self.messages.pop_front().flatten()
    }

    fn bus_name(&self) -> &'static str {
        "mock"
    }
}

// ---------------------------------------------------------------------------
// ChannelBus
// ---------------------------------------------------------------------------

/// A mock bus controlled externally via a [`ChannelBusHandle`].
///
/// The stream ends when every handle is dropped.
pub struct ChannelBus {
    rx: mpsc::Receiver<BusMessage>,
    connect_count: Arc<AtomicU32>,
}

/// Control handle for a [`ChannelBus`].
#[derive(Clone)]
pub struct ChannelBusHandle {
    tx: mpsc::Sender<BusMessage>,
    connect_count: Arc<AtomicU32>,
}

impl ChannelBusHandle {
    /// Publish a payload on a channel.
    pub async fn publish(&self, channel: &str, payload: &str) {
        let _ = self.tx.send(event(channel, payload)).await;
    }

    /// Simulate a dropped connection.
    pub async fn disconnect(&self, reason: &str) {
        let _ = self.tx.send(disconnect(reason)).await;
    }

    /// Simulate an idle poll.
    pub async fn idle(&self) {
        let _ = self.tx.send(BusMessage::Idle).await;
    }

    pub fn connect_count(&self) -> u32 {
        self.connect_count.load(Ordering::SeqCst)
    }
}

impl ChannelBus {
    /// Create a bus and its control handle.
    pub fn new(capacity: usize) -> (Self, ChannelBusHandle) {
        let (tx, rx) = mpsc::channel(capacity);
        let connect_count = Arc::new(AtomicU32::new(0));
        (
            Self {
                rx,
                connect_count: connect_count.clone(),
            },
            ChannelBusHandle { tx, connect_count },
        )
    }
}

#[async_trait]
impl EventBus for ChannelBus {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn subscribe(&mut self, _channels: &[String]) -> Result<()> {
        Ok(())
    }

    async fn next_message(&mut self) -> Option<BusMessage> {
        self.rx.recv().await
    }

    fn bus_name(&self) -> &'static str {
        "channel"
    }
}
