//! Infrastructure configuration modules.

pub mod logging;
pub mod reconnection;
pub mod settings;
pub mod store;
pub mod telegram;

pub use settings::Config;
