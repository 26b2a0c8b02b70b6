//! Relay domain types.
//!
//! Plain data shared by every layer: who receives broadcasts
//! ([`SubscriberId`]), what arrives from the bus ([`ChannelEvent`]), and how
//! a broadcast went ([`DeliveryOutcome`], [`BroadcastReport`]).

pub mod delivery;
pub mod event;
pub mod subscriber;

pub use delivery::{BroadcastReport, DeliveryOutcome};
pub use event::ChannelEvent;
pub use subscriber::SubscriberId;
