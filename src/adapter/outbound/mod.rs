//! Outbound adapters (driven side).

pub mod markdown;
pub mod redis;
pub mod store;
#[cfg(feature = "telegram")]
pub mod telegram;
