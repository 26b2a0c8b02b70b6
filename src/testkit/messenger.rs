//! Scripted [`Messenger`] for dispatcher and relay tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::SubscriberId;
use crate::port::outbound::messenger::{DeliveryError, Messenger};

/// What a scripted send does for one subscriber.
#[derive(Debug, Clone)]
pub enum Script {
    /// Deliver successfully (the default).
    Deliver,
    /// Fail every time with this error.
    Fail(DeliveryError),
    /// Sleep this long, then deliver.
    Hang(Duration),
    /// Panic inside `send`.
    Panic,
}

/// Messenger whose outcome is scripted per subscriber.
///
/// Clones share scripts and recorded sends, so a test can keep one handle
/// while the dispatcher owns another.
#[derive(Clone, Default)]
pub struct ScriptedMessenger {
    scripts: Arc<Mutex<HashMap<SubscriberId, Script>>>,
    delivered: Arc<Mutex<Vec<(SubscriberId, String)>>>,
    attempts: Arc<AtomicU32>,
}

impl ScriptedMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(self, subscriber: SubscriberId, script: Script) -> Self {
        self.scripts.lock().insert(subscriber, script);
        self
    }

    /// Change a subscriber's script after construction.
    pub fn set_script(&self, subscriber: SubscriberId, script: Script) {
        self.scripts.lock().insert(subscriber, script);
    }

    /// Subscribers that received at least one message, sorted.
    pub fn sent_to(&self) -> Vec<SubscriberId> {
        let mut ids: Vec<_> = self.delivered.lock().iter().map(|(id, _)| *id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    /// Texts delivered to one subscriber, in delivery order.
    pub fn texts_for(&self, subscriber: SubscriberId) -> Vec<String> {
        self.delivered
            .lock()
            .iter()
            .filter(|(id, _)| *id == subscriber)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Total successful deliveries.
    pub fn delivered_count(&self) -> usize {
        self.delivered.lock().len()
    }

    /// Total `send` calls, successful or not.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Messenger for ScriptedMessenger {
    async fn send(&self, subscriber: SubscriberId, text: &str) -> Result<(), DeliveryError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let script = self
            .scripts
            .lock()
            .get(&subscriber)
            .cloned()
            .unwrap_or(Script::Deliver);

        match script {
            Script::Deliver => {}
            Script::Fail(error) => return Err(error),
            Script::Hang(duration) => tokio::time::sleep(duration).await,
            Script::Panic => panic!("scripted messenger panic for {subscriber}"),
        }

        self.delivered.lock().push((subscriber, text.to_string()));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}
