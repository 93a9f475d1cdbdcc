//! User-facing usage text.

use std::fmt::Write as _;

use crate::config::{MergeConfig, TriggerPrecedence};

/// Static description of the merge triggers.
pub const HELP_TEXT: &str = "\
Message merger usage:
1. Send a start trigger to begin merging; no replies are sent while merging.
2. Send an end trigger to finish merging; the merged messages are answered once.
3. Send an instant trigger to merge everything buffered so far and get a reply right away.
4. When the buffered message count reaches the configured limit, messages are merged and answered automatically.
5. Messages sent while merging never get an individual reply.
6. Only the merged message is sent to the model.
7. If no reply arrives for a long time, check the connection or send the message again.
8. With `trigger_precedence: triggers_first` (default), end and instant triggers work while merging; with `merge_mode_first` they are buffered like any other message.";

/// Help text followed by the configured triggers and thresholds.
pub fn render_help(config: &MergeConfig) -> String {
    let mut out = String::from(HELP_TEXT);
    out.push_str("\n\nCurrent settings:\n");
    let _ = writeln!(out, "- start triggers: {}", list(&config.start_triggers));
    let _ = writeln!(out, "- end triggers: {}", list(&config.end_triggers));
    let _ = writeln!(out, "- instant triggers: {}", list(&config.instant_triggers));
    let _ = writeln!(out, "- message count: {}", config.message_count);
    let _ = writeln!(
        out,
        "- merge interval: {}s",
        config.merge_interval.as_secs_f64()
    );
    if config.trigger_precedence == TriggerPrecedence::MergeModeFirst {
        out.push_str("- note: end and instant triggers are buffered while merging\n");
    }
    out
}

fn list(triggers: &[String]) -> String {
    if triggers.is_empty() {
        "(none)".to_string()
    } else {
        triggers
            .iter()
            .map(|trigger| format!("`{trigger}`"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}
