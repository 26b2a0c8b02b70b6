//! Application services: the relay pipeline and the state it shares.
//!
//! - [`subscriber`] - durable subscriber set with write-through persistence
//! - [`dedup`] - window-based duplicate suppression
//! - [`dispatch`] - isolated fan-out delivery
//! - [`relay`] - the event loop tying them together
//! - [`state`] - lifecycle state and counters

pub mod dedup;
pub mod dispatch;
pub mod relay;
pub mod state;
pub mod subscriber;

pub use relay::{ProcessOutcome, Relay, RelayBuilder};
pub use state::{RelayState, RelayStats, RelayStatus};
pub use subscriber::SubscriberStore;
