//! Infrastructure: configuration, wiring and runtime lifecycle.

pub mod bootstrap;
pub mod bus;
pub mod config;
pub mod orchestration;
