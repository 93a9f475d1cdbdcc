use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex as StdMutex;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::config::MergeConfig;
use crate::engine::SessionBuffer;

pub(super) type SessionMap = HashMap<String, Arc<Mutex<SessionBuffer>>>;

/// Cloneable, concurrency-safe merge engine.
///
/// Each session buffer sits behind its own async lock, so different sessions
/// never contend; events of one session are serialized in lock order.
#[derive(Clone)]
pub struct SharedMergeEngine {
    pub(super) config: Arc<MergeConfig>,
    pub(super) sessions: Arc<StdMutex<SessionMap>>,
}

/// Point-in-time copy of one session buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BufferSnapshot {
    /// Buffered lines in arrival order.
    pub lines: Vec<String>,
    /// Whether explicit merge mode is open.
    pub merging: bool,
}
