use std::time::{Duration, SystemTime};

use crate::config::{MergeConfig, TriggerPrecedence};
use crate::observability::MergeEvent;

use super::decision::Decision;
use super::trigger::TriggerKind;

/// Per-session merge state.
///
/// `lines` is empty right after every flush. While `merging` is set, count and
/// staleness checks are suspended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionBuffer {
    lines: Vec<String>,
    last_activity: Option<SystemTime>,
    last_seen: Option<SystemTime>,
    merging: bool,
}

/// Result of applying one event to a buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Transition {
    pub(crate) decision: Decision,
    pub(crate) event: MergeEvent,
    /// Lines dropped because the count-based buffer went stale.
    pub(crate) discarded_lines: usize,
    /// Lines joined into the emitted payload.
    pub(crate) merged_lines: usize,
    /// Lines held after the event.
    pub(crate) buffered_lines: usize,
}

impl SessionBuffer {
    /// Buffered lines in arrival order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether an explicit merge session is open.
    pub fn is_merging(&self) -> bool {
        self.merging
    }

    /// Timestamp of the last line buffered on the normal (count-based) path.
    pub fn last_activity(&self) -> Option<SystemTime> {
        self.last_activity
    }

    /// Timestamp of the last event of any kind for this session.
    pub fn last_seen(&self) -> Option<SystemTime> {
        self.last_seen
    }

    /// Whether the session has seen no event for longer than `idle`.
    pub fn is_idle(&self, now: SystemTime, idle: Duration) -> bool {
        self.last_seen
            .is_none_or(|seen| elapsed_between(seen, now) > idle)
    }

    pub(crate) fn apply(
        &mut self,
        kind: TriggerKind,
        text: &str,
        now: SystemTime,
        config: &MergeConfig,
    ) -> Transition {
        self.last_seen = Some(now);
        match kind {
            TriggerKind::Start => {
                self.merging = true;
                self.lines.clear();
                self.transition(Decision::Suppress, MergeEvent::MergeStarted)
            }
            _ if self.merging => self.apply_merging(kind, text, config.trigger_precedence),
            TriggerKind::End => self.transition(Decision::Suppress, MergeEvent::EndTriggerIgnored),
            TriggerKind::Instant => self.flush_instant(text),
            TriggerKind::Plain => self.push_plain(text, now, config),
        }
    }

    fn apply_merging(
        &mut self,
        kind: TriggerKind,
        text: &str,
        precedence: TriggerPrecedence,
    ) -> Transition {
        let honor_triggers = precedence == TriggerPrecedence::TriggersFirst;
        match kind {
            TriggerKind::End if honor_triggers => {
                self.merging = false;
                let (merged, merged_lines) = self.drain();
                self.transition(Decision::Emit(merged), MergeEvent::MergeClosed)
                    .with_merged(merged_lines)
            }
            TriggerKind::Instant if honor_triggers => self.flush_instant(text),
            _ => {
                self.lines.push(text.to_string());
                self.transition(Decision::Suppress, MergeEvent::MergeLineBuffered)
            }
        }
    }

    fn flush_instant(&mut self, text: &str) -> Transition {
        if self.lines.is_empty() {
            return self.transition(Decision::Suppress, MergeEvent::InstantIgnored);
        }
        self.lines.push(text.to_string());
        let (merged, merged_lines) = self.drain();
        self.transition(Decision::Emit(merged), MergeEvent::InstantFlushed)
            .with_merged(merged_lines)
    }

    fn push_plain(&mut self, text: &str, now: SystemTime, config: &MergeConfig) -> Transition {
        let stale = self
            .last_activity
            .is_none_or(|last| elapsed_between(last, now) > config.merge_interval);
        let discarded = if stale {
            let dropped = self.lines.len();
            self.lines.clear();
            dropped
        } else {
            0
        };

        self.lines.push(text.to_string());
        self.last_activity = Some(now);

        let transition = if self.lines.len() >= config.flush_threshold() {
            let (merged, merged_lines) = self.drain();
            self.transition(Decision::Emit(merged), MergeEvent::CountFlushed)
                .with_merged(merged_lines)
        } else {
            self.transition(Decision::Suppress, MergeEvent::MessageBuffered)
        };
        transition.with_discarded(discarded)
    }

    fn drain(&mut self) -> (String, usize) {
        let lines = std::mem::take(&mut self.lines);
        (lines.join("\n"), lines.len())
    }

    fn transition(&self, decision: Decision, event: MergeEvent) -> Transition {
        Transition {
            decision,
            event,
            discarded_lines: 0,
            merged_lines: 0,
            buffered_lines: self.lines.len(),
        }
    }
}

impl Transition {
    fn with_discarded(mut self, discarded_lines: usize) -> Self {
        self.discarded_lines = discarded_lines;
        self
    }

    fn with_merged(mut self, merged_lines: usize) -> Self {
        self.merged_lines = merged_lines;
        self
    }
}

// A clock that moved backwards counts as no time elapsed.
fn elapsed_between(earlier: SystemTime, later: SystemTime) -> Duration {
    later.duration_since(earlier).unwrap_or(Duration::ZERO)
}
