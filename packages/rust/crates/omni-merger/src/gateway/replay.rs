//! Replay recorded events through a fresh engine with their recorded timestamps.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::channel::InboundMessage;
use crate::engine::MergeEngine;

/// One replayed decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayRecord {
    /// Session the event belonged to.
    pub session_id: String,
    /// Recorded timestamp, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// `suppress` or `emit`.
    pub decision: &'static str,
    /// Merged payload for `emit`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merged: Option<String>,
}

/// Read a JSON array of `{session_id, content, timestamp?}` events.
pub fn load_replay_events(path: &Path) -> Result<Vec<InboundMessage>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read replay file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid replay events in {}", path.display()))
}

/// Feed `events` through `engine` in order, recording each decision.
pub fn replay_events(engine: &mut MergeEngine, events: &[InboundMessage]) -> Vec<ReplayRecord> {
    events
        .iter()
        .map(|event| {
            let decision = engine.handle(&event.session_id, &event.content, event.received_at());
            ReplayRecord {
                session_id: event.session_id.clone(),
                timestamp: event.timestamp,
                decision: decision.label(),
                merged: decision.into_merged_text(),
            }
        })
        .collect()
}
