//! Merge engine configuration (resolved from `MergerSettings`).

use std::time::Duration;

use super::settings::MergerSettings;

/// Default staleness window for the count-based buffer, in seconds.
pub const DEFAULT_MERGE_INTERVAL_SECS: u64 = 60;
/// Default number of buffered lines that triggers an automatic flush.
pub const DEFAULT_MESSAGE_COUNT: usize = 6;

/// How end / instant triggers are treated while a session is in merge mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerPrecedence {
    /// End-trigger closes merge mode; instant-trigger flushes without leaving it.
    #[default]
    TriggersFirst,
    /// Merge mode swallows every message, end / instant triggers included.
    MergeModeFirst,
}

impl TriggerPrecedence {
    /// Parse a settings value (`triggers_first` | `merge_mode_first`).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "triggers_first" => Some(Self::TriggersFirst),
            "merge_mode_first" | "legacy" => Some(Self::MergeModeFirst),
            _ => None,
        }
    }

    /// Canonical settings label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TriggersFirst => "triggers_first",
            Self::MergeModeFirst => "merge_mode_first",
        }
    }
}

/// Read-only input of the merge engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    /// Substrings that open an explicit merge session.
    pub start_triggers: Vec<String>,
    /// Substrings that close an explicit merge session and emit the buffer.
    pub end_triggers: Vec<String>,
    /// Substrings that emit whatever is buffered, message included.
    pub instant_triggers: Vec<String>,
    /// Gap after which the count-based buffer is discarded as stale.
    pub merge_interval: Duration,
    /// Buffered line count that triggers an automatic flush (0 behaves like 1).
    pub message_count: usize,
    /// Trigger handling while in merge mode.
    pub trigger_precedence: TriggerPrecedence,
    /// Evict sessions idle for longer than this (disabled when `None`).
    pub idle_eviction: Option<Duration>,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            start_triggers: Vec::new(),
            end_triggers: Vec::new(),
            instant_triggers: Vec::new(),
            merge_interval: Duration::from_secs(DEFAULT_MERGE_INTERVAL_SECS),
            message_count: DEFAULT_MESSAGE_COUNT,
            trigger_precedence: TriggerPrecedence::default(),
            idle_eviction: None,
        }
    }
}

impl MergeConfig {
    /// Resolve settings into an engine config, falling back to defaults per field.
    pub fn from_settings(settings: &MergerSettings) -> Self {
        let defaults = Self::default();
        let merge_interval = match settings.merge_interval {
            None => defaults.merge_interval,
            Some(secs) if secs.is_nan() => {
                tracing::warn!(
                    merge_interval = secs,
                    "merge_interval is not a number; using default"
                );
                defaults.merge_interval
            }
            // Too large for a `Duration` (including +inf) means "never stale".
            Some(secs) => Duration::try_from_secs_f64(secs.max(0.0)).unwrap_or(Duration::MAX),
        };
        let trigger_precedence = match settings.trigger_precedence.as_deref() {
            None => defaults.trigger_precedence,
            Some(raw) => TriggerPrecedence::parse(raw).unwrap_or_else(|| {
                tracing::warn!(
                    trigger_precedence = raw,
                    "invalid trigger_precedence; expected triggers_first|merge_mode_first"
                );
                defaults.trigger_precedence
            }),
        };

        Self {
            start_triggers: normalize_triggers("start_triggers", settings.start_triggers.clone()),
            end_triggers: normalize_triggers("end_triggers", settings.end_triggers.clone()),
            instant_triggers: normalize_triggers(
                "instant_triggers",
                settings.instant_triggers.clone(),
            ),
            merge_interval,
            message_count: settings.message_count.unwrap_or(defaults.message_count),
            trigger_precedence,
            idle_eviction: settings
                .idle_eviction_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    /// Builder-style setter for start triggers.
    #[must_use]
    pub fn with_start_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start_triggers = collect_triggers(triggers);
        self
    }

    /// Builder-style setter for end triggers.
    #[must_use]
    pub fn with_end_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.end_triggers = collect_triggers(triggers);
        self
    }

    /// Builder-style setter for instant triggers.
    #[must_use]
    pub fn with_instant_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instant_triggers = collect_triggers(triggers);
        self
    }

    /// Builder-style setter for the staleness window.
    #[must_use]
    pub fn with_merge_interval(mut self, merge_interval: Duration) -> Self {
        self.merge_interval = merge_interval;
        self
    }

    /// Builder-style setter for the flush threshold.
    #[must_use]
    pub fn with_message_count(mut self, message_count: usize) -> Self {
        self.message_count = message_count;
        self
    }

    /// Builder-style setter for trigger precedence while merging.
    #[must_use]
    pub fn with_trigger_precedence(mut self, precedence: TriggerPrecedence) -> Self {
        self.trigger_precedence = precedence;
        self
    }

    /// Builder-style setter for idle eviction.
    #[must_use]
    pub fn with_idle_eviction(mut self, idle: Option<Duration>) -> Self {
        self.idle_eviction = idle;
        self
    }

    /// Effective flush threshold (never below one line).
    pub(crate) fn flush_threshold(&self) -> usize {
        self.message_count.max(1)
    }

    /// Render back into the settings document shape.
    pub fn to_settings(&self) -> MergerSettings {
        MergerSettings {
            start_triggers: Some(self.start_triggers.clone()),
            end_triggers: Some(self.end_triggers.clone()),
            instant_triggers: Some(self.instant_triggers.clone()),
            merge_interval: Some(self.merge_interval.as_secs_f64()),
            message_count: Some(self.message_count),
            trigger_precedence: Some(self.trigger_precedence.as_str().to_string()),
            idle_eviction_secs: self.idle_eviction.map(|idle| idle.as_secs()),
        }
    }
}

fn collect_triggers<I, S>(triggers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    triggers.into_iter().map(Into::into).collect()
}

// An empty trigger is a substring of every message; kept as configured.
fn normalize_triggers(field: &str, triggers: Option<Vec<String>>) -> Vec<String> {
    let triggers = triggers.unwrap_or_default();
    let empty = triggers.iter().filter(|trigger| trigger.is_empty()).count();
    if empty > 0 {
        tracing::warn!(
            field,
            empty,
            "empty trigger string matches every message"
        );
    }
    triggers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = MergeConfig::default();
        assert_eq!(config.merge_interval, Duration::from_secs(60));
        assert_eq!(config.message_count, 6);
        assert!(config.start_triggers.is_empty());
        assert!(config.end_triggers.is_empty());
        assert!(config.instant_triggers.is_empty());
        assert_eq!(config.trigger_precedence, TriggerPrecedence::TriggersFirst);
        assert_eq!(config.idle_eviction, None);
    }

    #[test]
    fn from_empty_settings_uses_defaults() {
        let config = MergeConfig::from_settings(&MergerSettings::default());
        assert_eq!(config, MergeConfig::default());
    }

    #[test]
    fn from_settings_keeps_empty_triggers_and_drops_zero_idle() {
        let settings = MergerSettings {
            start_triggers: Some(vec![String::new(), "#merge_start".to_string()]),
            merge_interval: Some(1.5),
            idle_eviction_secs: Some(0),
            ..MergerSettings::default()
        };
        let config = MergeConfig::from_settings(&settings);
        assert_eq!(
            config.start_triggers,
            vec![String::new(), "#merge_start".to_string()]
        );
        assert_eq!(config.merge_interval, Duration::from_millis(1_500));
        assert_eq!(config.idle_eviction, None);
    }

    #[test]
    fn negative_interval_clamps_to_zero() {
        let settings = MergerSettings {
            merge_interval: Some(-5.0),
            ..MergerSettings::default()
        };
        assert_eq!(
            MergeConfig::from_settings(&settings).merge_interval,
            Duration::ZERO
        );
    }

    #[test]
    fn oversized_interval_saturates_instead_of_falling_back() {
        for secs in [1e20, f64::INFINITY] {
            let settings = MergerSettings {
                merge_interval: Some(secs),
                ..MergerSettings::default()
            };
            assert_eq!(
                MergeConfig::from_settings(&settings).merge_interval,
                Duration::MAX
            );
        }
    }

    #[test]
    fn nan_interval_uses_default() {
        let settings = MergerSettings {
            merge_interval: Some(f64::NAN),
            ..MergerSettings::default()
        };
        assert_eq!(
            MergeConfig::from_settings(&settings).merge_interval,
            Duration::from_secs(DEFAULT_MERGE_INTERVAL_SECS)
        );
    }

    #[test]
    fn precedence_parse_accepts_aliases() {
        assert_eq!(
            TriggerPrecedence::parse("Merge-Mode-First"),
            Some(TriggerPrecedence::MergeModeFirst)
        );
        assert_eq!(
            TriggerPrecedence::parse("legacy"),
            Some(TriggerPrecedence::MergeModeFirst)
        );
        assert_eq!(
            TriggerPrecedence::parse(" triggers_first "),
            Some(TriggerPrecedence::TriggersFirst)
        );
        assert_eq!(TriggerPrecedence::parse("sometimes"), None);
    }

    #[test]
    fn to_settings_round_trips_through_from_settings() {
        let config = MergeConfig::default()
            .with_start_triggers(["#merge_start"])
            .with_end_triggers(["#merge_end"])
            .with_message_count(3)
            .with_trigger_precedence(TriggerPrecedence::MergeModeFirst)
            .with_idle_eviction(Some(Duration::from_secs(600)));
        assert_eq!(MergeConfig::from_settings(&config.to_settings()), config);
    }
}
