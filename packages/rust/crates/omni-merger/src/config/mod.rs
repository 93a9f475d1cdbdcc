//! Config namespace: engine config and merger settings loading.

mod merge;
mod settings;

pub use merge::{DEFAULT_MERGE_INTERVAL_SECS, DEFAULT_MESSAGE_COUNT, MergeConfig, TriggerPrecedence};
pub use settings::{
    MergerSettings, apply_settings_overrides, load_merger_settings,
    load_merger_settings_from_paths, merger_settings_paths, set_config_home_override,
    try_load_layered_settings, try_load_settings,
};
