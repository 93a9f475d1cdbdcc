//! Synchronous merge engine: session_id → `SessionBuffer`.

use std::collections::HashMap;
use std::time::{Duration, SystemTime};

use crate::config::MergeConfig;
use crate::observability::{MergeEvent, trace_transition};

use super::buffer::SessionBuffer;
use super::decision::Decision;
use super::trigger::classify;

/// Owns every session buffer and applies the merge state machine.
///
/// Callers must feed events of one session in arrival order. For concurrent
/// hosts use [`crate::SharedMergeEngine`].
#[derive(Debug, Clone, Default)]
pub struct MergeEngine {
    config: MergeConfig,
    sessions: HashMap<String, SessionBuffer>,
}

impl MergeEngine {
    /// Create an engine with an injected config and no sessions.
    #[must_use]
    pub fn new(config: MergeConfig) -> Self {
        Self {
            config,
            sessions: HashMap::new(),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Handle one text event for `session_id` observed at `now`.
    pub fn handle(&mut self, session_id: &str, text: &str, now: SystemTime) -> Decision {
        let kind = classify(&self.config, text);
        if !kind.creates_session() && !self.sessions.contains_key(session_id) {
            return Decision::Suppress;
        }
        let buffer = self.sessions.entry(session_id.to_string()).or_default();
        let transition = buffer.apply(kind, text, now, &self.config);
        trace_transition(session_id, &transition);
        transition.decision
    }

    /// Handle one text event stamped with the wall clock.
    pub fn handle_now(&mut self, session_id: &str, text: &str) -> Decision {
        self.handle(session_id, text, SystemTime::now())
    }

    /// Session state, if the session has been seen.
    pub fn session(&self, session_id: &str) -> Option<&SessionBuffer> {
        self.sessions.get(session_id)
    }

    /// Buffered lines for a session in arrival order.
    pub fn buffered(&self, session_id: &str) -> Option<&[String]> {
        self.session(session_id).map(SessionBuffer::lines)
    }

    /// Whether `session_id` is in explicit merge mode.
    pub fn is_merging(&self, session_id: &str) -> bool {
        self.session(session_id)
            .is_some_and(SessionBuffer::is_merging)
    }

    /// Number of tracked sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop all state for one session. Returns whether it existed.
    pub fn reset(&mut self, session_id: &str) -> bool {
        let existed = self.sessions.remove(session_id).is_some();
        if existed {
            tracing::debug!(
                event = MergeEvent::SessionReset.as_str(),
                session_id,
                "merge session reset"
            );
        }
        existed
    }

    /// Evict sessions with no event for longer than `idle`. Returns the evicted count.
    pub fn evict_idle(&mut self, now: SystemTime, idle: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, buffer| !buffer.is_idle(now, idle));
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            tracing::info!(
                event = MergeEvent::SessionsEvicted.as_str(),
                evicted,
                remaining = self.sessions.len(),
                idle_secs = idle.as_secs(),
                "idle merge sessions evicted"
            );
        }
        evicted
    }
}
