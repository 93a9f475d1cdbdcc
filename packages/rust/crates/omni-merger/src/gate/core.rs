use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;
use std::time::{Duration, SystemTime};

use tokio::sync::Mutex;

use crate::channel::InboundMessage;
use crate::config::MergeConfig;
use crate::engine::{Decision, SessionBuffer, classify};
use crate::observability::{MergeEvent, trace_transition};

use super::types::{BufferSnapshot, SessionMap, SharedMergeEngine};

impl Default for SharedMergeEngine {
    fn default() -> Self {
        Self::new(MergeConfig::default())
    }
}

impl SharedMergeEngine {
    /// Create an engine with an injected config and no sessions.
    pub fn new(config: MergeConfig) -> Self {
        Self {
            config: Arc::new(config),
            sessions: Arc::new(StdMutex::new(HashMap::new())),
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    /// Handle one text event; only the target session is locked.
    pub async fn handle(&self, session_id: &str, text: &str, now: SystemTime) -> Decision {
        let kind = classify(&self.config, text);
        loop {
            let Some(entry) = self.entry(session_id, kind.creates_session()) else {
                return Decision::Suppress;
            };
            let mut buffer = entry.lock().await;
            // The sweeper may have evicted this entry while we waited for the lock.
            if !self.is_current(session_id, &entry) {
                continue;
            }
            let transition = buffer.apply(kind, text, now, &self.config);
            trace_transition(session_id, &transition);
            return transition.decision;
        }
    }

    /// Run a host message through the engine; `None` means drop it.
    pub async fn process(&self, message: InboundMessage) -> Option<InboundMessage> {
        let decision = self
            .handle(&message.session_id, &message.content, message.received_at())
            .await;
        decision.apply(message)
    }

    /// Copy of one session's state, if the session exists.
    pub async fn snapshot(&self, session_id: &str) -> Option<BufferSnapshot> {
        let entry = self.entry(session_id, false)?;
        let buffer = entry.lock().await;
        Some(BufferSnapshot {
            lines: buffer.lines().to_vec(),
            merging: buffer.is_merging(),
        })
    }

    /// Number of tracked sessions.
    pub fn session_count(&self) -> usize {
        self.lock_sessions().len()
    }

    /// Drop all state for one session. Returns whether it existed.
    pub fn reset(&self, session_id: &str) -> bool {
        let existed = self.lock_sessions().remove(session_id).is_some();
        if existed {
            tracing::debug!(
                event = MergeEvent::SessionReset.as_str(),
                session_id,
                "merge session reset"
            );
        }
        existed
    }

    /// Evict sessions idle for longer than `idle`. Sessions currently locked are skipped.
    pub fn evict_idle(&self, now: SystemTime, idle: Duration) -> usize {
        let mut sessions = self.lock_sessions();
        let before = sessions.len();
        sessions.retain(|_, entry| match entry.try_lock() {
            Ok(buffer) => !buffer.is_idle(now, idle),
            Err(_) => true,
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!(
                event = MergeEvent::SessionsEvicted.as_str(),
                evicted,
                remaining = sessions.len(),
                idle_secs = idle.as_secs(),
                "idle merge sessions evicted"
            );
        }
        evicted
    }

    fn entry(&self, session_id: &str, create: bool) -> Option<Arc<Mutex<SessionBuffer>>> {
        let mut sessions = self.lock_sessions();
        if create {
            return Some(
                sessions
                    .entry(session_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(SessionBuffer::default())))
                    .clone(),
            );
        }
        sessions.get(session_id).cloned()
    }

    fn is_current(&self, session_id: &str, entry: &Arc<Mutex<SessionBuffer>>) -> bool {
        self.lock_sessions()
            .get(session_id)
            .is_some_and(|current| Arc::ptr_eq(current, entry))
    }

    fn lock_sessions(&self) -> std::sync::MutexGuard<'_, SessionMap> {
        self.sessions
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
