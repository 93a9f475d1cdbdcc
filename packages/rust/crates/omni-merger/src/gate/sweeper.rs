use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::observability::MergeEvent;

use super::types::SharedMergeEngine;

const MIN_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

impl SharedMergeEngine {
    /// Spawn the idle-eviction loop on the current tokio runtime.
    ///
    /// Returns `None` when `idle_eviction` is not configured. The task runs until aborted.
    pub fn spawn_idle_sweeper(&self, every: Duration) -> Option<JoinHandle<()>> {
        let idle = self.config.idle_eviction?;
        let every = every.max(MIN_SWEEP_INTERVAL);
        let engine = self.clone();
        tracing::info!(
            event = MergeEvent::SweeperStarted.as_str(),
            idle_secs = idle.as_secs(),
            every_secs = every.as_secs(),
            "idle session sweeper started"
        );
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                engine.evict_idle(SystemTime::now(), idle);
            }
        }))
    }
}
