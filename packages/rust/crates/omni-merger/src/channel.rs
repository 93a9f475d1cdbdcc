//! Host-side message type and decision application.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::engine::Decision;

/// A text message received from a host channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Session partition key (one merge buffer per key).
    pub session_id: String,
    /// Message text content.
    pub content: String,
    /// Unix timestamp in seconds; `None` means "now".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl InboundMessage {
    /// Message observed at the current wall clock.
    pub fn new(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            content: content.into(),
            timestamp: None,
        }
    }

    /// Attach an explicit unix timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Time the engine should use for this message.
    pub fn received_at(&self) -> SystemTime {
        self.timestamp
            .map_or_else(SystemTime::now, |secs| UNIX_EPOCH + Duration::from_secs(secs))
    }
}

impl Decision {
    /// Apply to a host message: drop on suppress, substitute content on emit.
    #[must_use]
    pub fn apply(self, mut message: InboundMessage) -> Option<InboundMessage> {
        let merged = self.into_merged_text()?;
        message.content = merged;
        Some(message)
    }
}
