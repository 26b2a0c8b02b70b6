//! arbrelay - relay arbitrage events from Redis pub/sub to Telegram subscribers.
//!
//! Events published on one or more Redis channels are deduplicated, rendered
//! as Telegram messages and broadcast to every subscribed chat. One failing
//! recipient never blocks the others, and recipients that can no longer be
//! reached are dropped from the subscriber list automatically.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - [`domain`] - subscriber ids, channel events, delivery outcomes
//! - [`port`] - traits at the edges (bus, messenger, persistence, formatter,
//!   dedup, subscription control)
//! - [`application`] - the relay pipeline, dedup filter, broadcast dispatcher
//!   and subscriber store
//! - [`adapter`] - Redis, Telegram, JSON file store, MarkdownV2 formatter, CLI
//! - [`infrastructure`] - configuration, reconnection, wiring and lifecycle
//!
//! # Features
//!
//! - `telegram` (default) - Telegram Bot API delivery and bot commands
//! - `testkit` - test doubles for integration tests
//!
//! # Example
//!
//! ```no_run
//! use arbrelay::infrastructure::config::settings::Config;
//! use arbrelay::infrastructure::orchestration;
//!
//! # async fn example() -> arbrelay::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! config.init_logging();
//! orchestration::run(config).await
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
