//! Message formatting port.

use thiserror::Error;

use crate::domain::ChannelEvent;

/// Why a payload could not be turned into a chat message.
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Renders a raw bus payload into human-readable text.
pub trait MessageFormatter: Send + Sync {
    /// Format an event. Errors mean the payload is malformed and the event
    /// should be dropped.
    fn format(&self, event: &ChannelEvent) -> Result<String, FormatError>;
}
