//! Redis pub/sub adapter.
//!
//! - [`bus`] - [`EventBus`](crate::port::outbound::bus::EventBus) over a
//!   Redis subscription
//! - [`publisher`] - one-shot publishing and connectivity checks
//! - [`settings`] - connection settings

pub mod bus;
pub mod publisher;
pub mod settings;

pub use bus::RedisBus;
pub use settings::RedisSettings;
