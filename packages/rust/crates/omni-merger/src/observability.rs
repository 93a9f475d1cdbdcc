//! Structured event names emitted through `tracing`.

use crate::engine::{Decision, Transition};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MergeEvent {
    SettingsLoaded,
    MergeStarted,
    MergeLineBuffered,
    MergeClosed,
    EndTriggerIgnored,
    InstantFlushed,
    InstantIgnored,
    MessageBuffered,
    CountFlushed,
    StaleBufferDiscarded,
    SessionReset,
    SessionsEvicted,
    SweeperStarted,
}

impl MergeEvent {
    #[cfg(test)]
    const ALL: [Self; 13] = [
        Self::SettingsLoaded,
        Self::MergeStarted,
        Self::MergeLineBuffered,
        Self::MergeClosed,
        Self::EndTriggerIgnored,
        Self::InstantFlushed,
        Self::InstantIgnored,
        Self::MessageBuffered,
        Self::CountFlushed,
        Self::StaleBufferDiscarded,
        Self::SessionReset,
        Self::SessionsEvicted,
        Self::SweeperStarted,
    ];

    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::SettingsLoaded => "merger.settings.loaded",
            Self::MergeStarted => "merger.session.merge_started",
            Self::MergeLineBuffered => "merger.session.merge_line_buffered",
            Self::MergeClosed => "merger.session.merge_closed",
            Self::EndTriggerIgnored => "merger.session.end_trigger_ignored",
            Self::InstantFlushed => "merger.session.instant_flushed",
            Self::InstantIgnored => "merger.session.instant_ignored",
            Self::MessageBuffered => "merger.session.message_buffered",
            Self::CountFlushed => "merger.session.count_flushed",
            Self::StaleBufferDiscarded => "merger.session.stale_buffer_discarded",
            Self::SessionReset => "merger.session.reset",
            Self::SessionsEvicted => "merger.sessions.evicted",
            Self::SweeperStarted => "merger.sweeper.started",
        }
    }

    const fn is_flush_boundary(self) -> bool {
        matches!(
            self,
            Self::MergeStarted | Self::MergeClosed | Self::InstantFlushed | Self::CountFlushed
        )
    }
}

/// Log one engine transition; flush boundaries at info, everything else at debug.
pub(crate) fn trace_transition(session_id: &str, transition: &Transition) {
    if transition.discarded_lines > 0 {
        tracing::debug!(
            event = MergeEvent::StaleBufferDiscarded.as_str(),
            session_id,
            discarded_lines = transition.discarded_lines,
            "stale buffer discarded"
        );
    }

    let (emitted, merged_chars) = match &transition.decision {
        Decision::Suppress => (false, 0),
        Decision::Emit(text) => (true, text.chars().count()),
    };
    if transition.event.is_flush_boundary() {
        tracing::info!(
            event = transition.event.as_str(),
            session_id,
            emitted,
            merged_lines = transition.merged_lines,
            merged_chars,
            "message merger transition"
        );
    } else {
        tracing::debug!(
            event = transition.event.as_str(),
            session_id,
            emitted,
            buffered_lines = transition.buffered_lines,
            "message merger transition"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::MergeEvent;

    #[test]
    fn event_ids_are_unique_and_namespaced() {
        let mut seen = HashSet::new();
        for event in MergeEvent::ALL {
            let id = event.as_str();
            assert!(id.starts_with("merger."), "unexpected event namespace: {id}");
            assert!(seen.insert(id), "duplicate event id: {id}");
        }
    }
}
