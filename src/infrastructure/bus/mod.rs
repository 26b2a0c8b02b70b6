//! Event bus construction.

pub mod reconnecting;

use std::sync::Arc;

pub use reconnecting::ReconnectingBus;

use crate::adapter::outbound::redis::RedisBus;
use crate::application::state::RelayStatus;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::bus::EventBus;

/// Redis bus wrapped with reconnection, reporting into `status`.
#[must_use]
pub fn create_bus(config: &Config, status: Arc<RelayStatus>) -> Box<dyn EventBus> {
    let redis = RedisBus::new(config.bus.clone());
    Box::new(ReconnectingBus::new(redis, config.reconnection.clone()).with_status(status))
}
