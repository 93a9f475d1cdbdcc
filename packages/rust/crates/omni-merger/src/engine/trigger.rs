use crate::config::MergeConfig;

/// Structural category of an inbound text, before session state is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    /// Contains a start trigger.
    Start,
    /// Contains an end trigger (and no start trigger).
    End,
    /// Contains an instant trigger (and no start / end trigger).
    Instant,
    /// Ordinary message.
    Plain,
}

impl TriggerKind {
    /// Whether handling this kind may create a session buffer.
    ///
    /// End / instant triggers for an unknown session are no-ops.
    pub(crate) fn creates_session(self) -> bool {
        matches!(self, Self::Start | Self::Plain)
    }
}

/// Classify `text` against the configured trigger lists.
///
/// Matching is an unanchored, case-sensitive substring test; start beats end beats instant.
pub fn classify(config: &MergeConfig, text: &str) -> TriggerKind {
    if contains_any(&config.start_triggers, text) {
        TriggerKind::Start
    } else if contains_any(&config.end_triggers, text) {
        TriggerKind::End
    } else if contains_any(&config.instant_triggers, text) {
        TriggerKind::Instant
    } else {
        TriggerKind::Plain
    }
}

fn contains_any(triggers: &[String], text: &str) -> bool {
    triggers
        .iter()
        .any(|trigger| text.contains(trigger.as_str()))
}
