//! Per-session message merger: buffers short chat messages and forwards one merged turn.
//!
//! - **Engine**: synchronous state machine (`MergeEngine`), one buffer per session id.
//! - **Gate**: async front end (`SharedMergeEngine`) with per-session locking and idle eviction.
//! - **Gateway**: stdio / replay dispatchers used by the `omni-merger` binary.
//!
//! Logging: set `RUST_LOG=omni_merger=debug` to see every state transition on stderr.

mod channel;
mod config;
mod engine;
mod error;
mod gate;
mod gateway;
mod help;
mod observability;

pub use channel::InboundMessage;
pub use config::{
    DEFAULT_MERGE_INTERVAL_SECS, DEFAULT_MESSAGE_COUNT, MergeConfig, MergerSettings,
    TriggerPrecedence, apply_settings_overrides, load_merger_settings,
    load_merger_settings_from_paths, merger_settings_paths, set_config_home_override,
    try_load_layered_settings, try_load_settings,
};
pub use engine::{Decision, MergeEngine, SessionBuffer, TriggerKind, classify};
pub use error::SettingsError;
pub use gate::{BufferSnapshot, SharedMergeEngine};
pub use gateway::{
    DEFAULT_STDIO_SEPARATOR, ReplayRecord, StdioOptions, load_replay_events, parse_stdio_line,
    replay_events, run_stdio, run_stdio_with,
};
pub use help::{HELP_TEXT, render_help};
