//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`bus`] - Mock [`EventBus`](crate::port::outbound::bus::EventBus)
//!   implementations: `ScriptedBus`, `ChannelBus`.
//! - [`messenger`] - `ScriptedMessenger` with per-subscriber outcomes.
//! - [`config`] - Canonical test configurations (reconnection, dedup, delivery).

pub mod bus;
pub mod config;
pub mod messenger;
