//! Reconnecting wrapper for [`EventBus`].
//!
//! Provides automatic reconnection with exponential backoff and circuit breaker
//! protection for any [`EventBus`] implementation. The wrapper hides
//! disconnections from the relay and resubscribes to the tracked channels.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::application::state::{RelayState, RelayStatus};
use crate::error::Result;
use crate::infrastructure::config::reconnection::ReconnectionConfig;
use crate::port::outbound::bus::{BusMessage, EventBus};

/// Circuit breaker state for connection attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CircuitState {
    /// Normal operation; connections are allowed.
    Closed,
    /// Too many consecutive failures; connections blocked until cooldown expires.
    Open {
        /// Instant when the circuit breaker will transition back to Closed.
        until: Instant,
    },
}

/// Wrapper that adds automatic reconnection to any [`EventBus`].
///
/// On a lost connection it:
/// 1. Waits with exponential backoff
/// 2. Reconnects to the bus
/// 3. Resubscribes to the tracked channels
///
/// A circuit breaker trips after too many consecutive failures. With
/// `max_retries` set, the stream ends once that many reconnect attempts
/// have failed in a row.
pub struct ReconnectingBus<B: EventBus> {
    inner: B,
    config: ReconnectionConfig,
    /// Channels to resubscribe after reconnection.
    channels: Vec<String>,
    consecutive_failures: u32,
    /// Failed reconnect attempts since the connection was last healthy.
    failed_attempts: u32,
    current_delay_ms: u64,
    circuit_state: CircuitState,
    connected: bool,
    status: Option<Arc<RelayStatus>>,
}

impl<B: EventBus> ReconnectingBus<B> {
    /// Wrap `inner`. Starts disconnected.
    pub fn new(inner: B, config: ReconnectionConfig) -> Self {
        let initial_delay = config.initial_delay_ms;
        Self {
            inner,
            config,
            channels: Vec::new(),
            consecutive_failures: 0,
            failed_attempts: 0,
            current_delay_ms: initial_delay,
            circuit_state: CircuitState::Closed,
            connected: false,
            status: None,
        }
    }

    /// Publish reconnect transitions to a shared status.
    #[must_use]
    pub fn with_status(mut self, status: Arc<RelayStatus>) -> Self {
        self.status = Some(status);
        self
    }

    fn set_state(&self, state: RelayState) {
        if let Some(status) = &self.status {
            status.set_state(state);
        }
    }

    fn reset_backoff(&mut self) {
        self.consecutive_failures = 0;
        self.current_delay_ms = self.config.initial_delay_ms;
        self.circuit_state = CircuitState::Closed;
    }

    /// Current delay plus jitter; advances the delay for the next call.
    fn next_delay(&mut self) -> Duration {
        let base_delay = Duration::from_millis(self.current_delay_ms);
        let delay = base_delay + Duration::from_millis(jitter_ms(base_delay));

        let next_delay = (self.current_delay_ms as f64 * self.config.backoff_multiplier) as u64;
        self.current_delay_ms = next_delay.min(self.config.max_delay_ms);

        delay
    }

    fn circuit_allows_connection(&mut self) -> bool {
        match self.circuit_state {
            CircuitState::Closed => true,
            CircuitState::Open { until } => {
                if Instant::now() >= until {
                    info!("Circuit breaker cooldown expired, allowing reconnection");
                    self.reset_backoff();
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_failure(&mut self) {
        self.consecutive_failures += 1;
        self.connected = false;

        if self.consecutive_failures >= self.config.max_consecutive_failures {
            let cooldown = Duration::from_millis(self.config.circuit_breaker_cooldown_ms);
            self.circuit_state = CircuitState::Open {
                until: Instant::now() + cooldown,
            };
            error!(
                failures = self.consecutive_failures,
                cooldown_secs = cooldown.as_secs(),
                "Circuit breaker tripped, pausing reconnection attempts"
            );
        }
    }

    fn connection_lost(&mut self) {
        self.record_failure();
        self.set_state(RelayState::Reconnecting);
    }

    fn retries_exhausted(&self) -> bool {
        self.config
            .max_retries
            .is_some_and(|max| self.failed_attempts >= max)
    }

    /// Wait out the backoff, then reconnect and resubscribe.
    async fn reconnect(&mut self) -> Result<()> {
        if !self.circuit_allows_connection() {
            if let CircuitState::Open { until } = self.circuit_state {
                let remaining = until.saturating_duration_since(Instant::now());
                warn!(
                    remaining_secs = remaining.as_secs(),
                    "Circuit breaker open, waiting for cooldown"
                );
                sleep(remaining).await;
                self.reset_backoff();
            }
        }

        let delay = self.next_delay();
        info!(
            bus = self.inner.bus_name(),
            delay_ms = delay.as_millis() as u64,
            attempt = self.failed_attempts + 1,
            "Reconnecting after delay"
        );
        sleep(delay).await;

        if let Err(e) = self.inner.connect().await {
            error!(error = %e, "Reconnection failed");
            self.record_failure();
            return Err(e);
        }

        if !self.channels.is_empty() {
            debug!(channels = ?self.channels, "Resubscribing to channels");
            if let Err(e) = self.inner.subscribe(&self.channels).await {
                error!(error = %e, "Resubscribe failed after reconnect");
                self.record_failure();
                return Err(e);
            }
        }

        info!(bus = self.inner.bus_name(), "Reconnected successfully");
        self.connected = true;
        self.failed_attempts = 0;
        self.reset_backoff();
        if let Some(status) = &self.status {
            status.record_reconnect();
            status.set_state(RelayState::Listening);
        }
        Ok(())
    }
}

/// Up to 20% random jitter so many clients do not reconnect in lockstep.
fn jitter_ms(base_delay: Duration) -> u64 {
    let jitter_range_ms = (base_delay.as_millis() as u64) / 5;
    if jitter_range_ms == 0 {
        return 0;
    }
    rand::thread_rng().gen_range(0..=jitter_range_ms)
}

#[async_trait]
impl<B: EventBus> EventBus for ReconnectingBus<B> {
    async fn connect(&mut self) -> Result<()> {
        match self.inner.connect().await {
            Ok(()) => {
                self.connected = true;
                self.reset_backoff();
                Ok(())
            }
            Err(e) => {
                self.record_failure();
                Err(e)
            }
        }
    }

    async fn subscribe(&mut self, channels: &[String]) -> Result<()> {
        // Kept for resubscription after reconnect
        self.channels = channels.to_vec();

        if !self.connected {
            debug!("Not connected, subscription deferred to reconnect");
            return Ok(());
        }

        let result = self.inner.subscribe(channels).await;
        if result.is_err() {
            self.record_failure();
        }
        result
    }

    async fn next_message(&mut self) -> Option<BusMessage> {
        loop {
            if !self.connected {
                if self.retries_exhausted() {
                    error!(
                        attempts = self.failed_attempts,
                        "Giving up on bus reconnection"
                    );
                    return None;
                }
                self.set_state(RelayState::Reconnecting);
                if let Err(e) = self.reconnect().await {
                    self.failed_attempts += 1;
                    warn!(error = %e, "Reconnection attempt failed, will retry");
                    continue;
                }
            }

            match self.inner.next_message().await {
                Some(BusMessage::Disconnected { reason }) => {
                    warn!(reason = %reason, "Bus connection lost, will reconnect");
                    self.connection_lost();
                }
                Some(message) => {
                    if self.consecutive_failures > 0 {
                        debug!("Bus healthy after reconnection, resetting failure count");
                        self.reset_backoff();
                    }
                    return Some(message);
                }
                None => {
                    warn!("Bus stream ended unexpectedly, will reconnect");
                    self.connection_lost();
                }
            }
        }
    }

    fn bus_name(&self) -> &'static str {
        self.inner.bus_name()
    }
}
