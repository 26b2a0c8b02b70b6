//! Events received from the pub/sub bus.

/// A raw payload published on a named bus channel.
///
/// The payload is kept exactly as received; parsing happens downstream in
/// the message formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelEvent {
    channel: String,
    payload: String,
}

impl ChannelEvent {
    /// Create a new event.
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }

    /// Channel the payload was published on.
    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Raw payload text.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }
}
