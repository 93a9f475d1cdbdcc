//! Merger settings loader.
//!
//! Loads and merges:
//! - System defaults: `<PRJ_ROOT>/packages/conf/message_merger.yaml`
//! - User overrides:  `<PRJ_CONFIG_HOME>/omni-dev-fusion/message_merger.yaml`
//!
//! Merge precedence is env over user over system. Documents may be YAML or JSON
//! (selected by file extension). Missing or malformed documents never fail startup.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::observability::MergeEvent;

const DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH: &str = "packages/conf/message_merger.yaml";
const DEFAULT_USER_SETTINGS_RELATIVE_PATH: &str = "omni-dev-fusion/message_merger.yaml";
const DEFAULT_CONFIG_HOME_RELATIVE_PATH: &str = ".config";

const ENV_MERGE_INTERVAL: &str = "OMNI_MERGER_MERGE_INTERVAL";
const ENV_MESSAGE_COUNT: &str = "OMNI_MERGER_MESSAGE_COUNT";
const ENV_IDLE_EVICTION_SECS: &str = "OMNI_MERGER_IDLE_EVICTION_SECS";

static CONFIG_HOME_OVERRIDE: OnceLock<PathBuf> = OnceLock::new();

/// Raw settings document; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct MergerSettings {
    /// Substrings that open a merge session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_triggers: Option<Vec<String>>,
    /// Substrings that close a merge session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_triggers: Option<Vec<String>>,
    /// Substrings that flush immediately.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instant_triggers: Option<Vec<String>>,
    /// Staleness window in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_interval: Option<f64>,
    /// Flush threshold in lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_count: Option<usize>,
    /// `triggers_first` | `merge_mode_first`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_precedence: Option<String>,
    /// Idle session eviction in seconds (0 disables).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idle_eviction_secs: Option<u64>,
}

impl MergerSettings {
    fn merge(self, overlay: Self) -> Self {
        Self {
            start_triggers: overlay.start_triggers.or(self.start_triggers),
            end_triggers: overlay.end_triggers.or(self.end_triggers),
            instant_triggers: overlay.instant_triggers.or(self.instant_triggers),
            merge_interval: overlay.merge_interval.or(self.merge_interval),
            message_count: overlay.message_count.or(self.message_count),
            trigger_precedence: overlay.trigger_precedence.or(self.trigger_precedence),
            idle_eviction_secs: overlay.idle_eviction_secs.or(self.idle_eviction_secs),
        }
    }
}

/// Load merged settings (env over user over system).
pub fn load_merger_settings() -> MergerSettings {
    let (system_path, user_path) = merger_settings_paths();
    let settings = load_merger_settings_from_paths(&system_path, &user_path);
    apply_settings_overrides(settings, |name| std::env::var(name).ok())
}

#[doc(hidden)]
pub fn merger_settings_paths() -> (PathBuf, PathBuf) {
    let root = project_root();
    let system_path = root.join(DEFAULT_SYSTEM_SETTINGS_RELATIVE_PATH);
    let user_path = resolve_config_home(&root).join(DEFAULT_USER_SETTINGS_RELATIVE_PATH);
    (system_path, user_path)
}

#[doc(hidden)]
pub fn load_merger_settings_from_paths(system: &Path, user: &Path) -> MergerSettings {
    load_one(system).merge(load_one(user))
}

/// Strictly load a single settings document.
///
/// Unlike the layered loader, a missing, unreadable or malformed file is an error.
pub fn try_load_settings(path: &Path) -> Result<MergerSettings, SettingsError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(path, &raw)
}

/// Strictly load the system/user layers. Absent layers are skipped.
pub fn try_load_layered_settings() -> Result<MergerSettings, SettingsError> {
    let (system_path, user_path) = merger_settings_paths();
    let mut merged = MergerSettings::default();
    for path in [system_path, user_path] {
        if path.exists() {
            merged = merged.merge(try_load_settings(&path)?);
        }
    }
    Ok(merged)
}

/// Apply `OMNI_MERGER_*` overrides using `lookup` to read variables.
///
/// Unparseable values are logged and ignored.
pub fn apply_settings_overrides<F>(mut settings: MergerSettings, lookup: F) -> MergerSettings
where
    F: Fn(&str) -> Option<String>,
{
    let read = |name: &str| lookup(name).and_then(non_empty_string);

    if let Some(raw) = read(ENV_MERGE_INTERVAL) {
        match raw.parse::<f64>() {
            Ok(value) => settings.merge_interval = Some(value),
            Err(error) => warn_invalid_override(ENV_MERGE_INTERVAL, &raw, &error),
        }
    }
    if let Some(raw) = read(ENV_MESSAGE_COUNT) {
        match raw.parse::<usize>() {
            Ok(value) => settings.message_count = Some(value),
            Err(error) => warn_invalid_override(ENV_MESSAGE_COUNT, &raw, &error),
        }
    }
    if let Some(raw) = read(ENV_IDLE_EVICTION_SECS) {
        match raw.parse::<u64>() {
            Ok(value) => settings.idle_eviction_secs = Some(value),
            Err(error) => warn_invalid_override(ENV_IDLE_EVICTION_SECS, &raw, &error),
        }
    }
    settings
}

fn warn_invalid_override(name: &str, raw: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(
        variable = name,
        value = raw,
        error = %error,
        "invalid settings override; ignoring"
    );
}

fn load_one(path: &Path) -> MergerSettings {
    if !path.exists() {
        return MergerSettings::default();
    }
    match try_load_settings(path) {
        Ok(value) => {
            tracing::debug!(
                event = MergeEvent::SettingsLoaded.as_str(),
                path = %path.display(),
                "merger settings loaded"
            );
            value
        }
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to load merger settings; using defaults for this file"
            );
            MergerSettings::default()
        }
    }
}

fn parse_document(path: &Path, raw: &str) -> Result<MergerSettings, SettingsError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "json" => serde_json::from_str(raw).map_err(|source| SettingsError::ParseJson {
            path: path.to_path_buf(),
            source,
        }),
        "yaml" | "yml" => {
            if raw.trim().is_empty() {
                return Ok(MergerSettings::default());
            }
            serde_yaml::from_str(raw).map_err(|source| SettingsError::ParseYaml {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => Err(SettingsError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

fn project_root() -> PathBuf {
    std::env::var("PRJ_ROOT")
        .ok()
        .and_then(non_empty_string)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Set config-home override (used by CLI `--conf`).
///
/// The path can be absolute, or relative to `PRJ_ROOT`/cwd.
pub fn set_config_home_override(path: impl Into<PathBuf>) {
    let path = path.into();
    if path.as_os_str().is_empty() {
        return;
    }
    if CONFIG_HOME_OVERRIDE.set(path.clone()).is_err()
        && let Some(current) = CONFIG_HOME_OVERRIDE.get()
        && current != &path
    {
        tracing::warn!(
            current = %current.display(),
            ignored = %path.display(),
            "config home override already set; ignoring subsequent value"
        );
    }
}

fn resolve_config_home(project_root: &Path) -> PathBuf {
    if let Some(path) = CONFIG_HOME_OVERRIDE.get() {
        return absolutize(project_root, path.clone());
    }

    let configured = std::env::var("PRJ_CONFIG_HOME")
        .ok()
        .and_then(non_empty_string)
        .unwrap_or_else(|| DEFAULT_CONFIG_HOME_RELATIVE_PATH.to_string());
    absolutize(project_root, PathBuf::from(configured))
}

fn absolutize(project_root: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        project_root.join(path)
    }
}

fn non_empty_string(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
