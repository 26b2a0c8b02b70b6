//! Outbound ports (driven side): interfaces implemented by outbound adapters.

pub mod bus;
pub mod dedup;
pub mod formatter;
pub mod messenger;
pub mod persistence;
