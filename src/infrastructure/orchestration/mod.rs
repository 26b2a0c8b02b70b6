//! Relay lifecycle.

mod runtime;

pub use runtime::{run, run_with_shutdown};
