//! Subscriber persistence backends.
//!
//! - [`file`] - JSON file on disk, replaced atomically on every save
//! - [`memory`] - in-process storage for tests and ephemeral runs

pub mod file;
pub mod memory;

pub use file::JsonFileBackend;
pub use memory::MemoryBackend;
