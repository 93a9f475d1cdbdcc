//! Integration tests: merger settings loading (files under a temp dir, no env mutation).

use std::collections::HashMap;
use std::time::Duration;

use omni_merger::{
    MergeConfig, MergerSettings, SettingsError, TriggerPrecedence, apply_settings_overrides,
    load_merger_settings_from_paths, try_load_settings,
};

#[test]
fn missing_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = load_merger_settings_from_paths(
        &dir.path().join("missing-system.yaml"),
        &dir.path().join("missing-user.yaml"),
    );
    assert_eq!(settings, MergerSettings::default());
    assert_eq!(MergeConfig::from_settings(&settings), MergeConfig::default());
}

#[test]
fn json_document_with_all_fields_loads() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r##"{
  "start_triggers": ["#merge_start", "开始合并"],
  "end_triggers": ["#merge_end"],
  "instant_triggers": ["#now"],
  "merge_interval": 30,
  "message_count": 4
}"##,
    )?;

    let config = MergeConfig::from_settings(&try_load_settings(&path)?);
    assert_eq!(
        config.start_triggers,
        vec!["#merge_start".to_string(), "开始合并".to_string()]
    );
    assert_eq!(config.end_triggers, vec!["#merge_end".to_string()]);
    assert_eq!(config.instant_triggers, vec!["#now".to_string()]);
    assert_eq!(config.merge_interval, Duration::from_secs(30));
    assert_eq!(config.message_count, 4);
    Ok(())
}

#[test]
fn user_yaml_overrides_system_yaml() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let system = dir.path().join("system.yaml");
    let user = dir.path().join("user.yml");
    std::fs::write(
        &system,
        "start_triggers: ['#merge_start']\nmessage_count: 8\nmerge_interval: 45\n",
    )?;
    std::fs::write(
        &user,
        "message_count: 2\ntrigger_precedence: merge_mode_first\nidle_eviction_secs: 900\n",
    )?;

    let config = MergeConfig::from_settings(&load_merger_settings_from_paths(&system, &user));
    assert_eq!(config.start_triggers, vec!["#merge_start".to_string()]);
    assert_eq!(config.message_count, 2);
    assert_eq!(config.merge_interval, Duration::from_secs(45));
    assert_eq!(config.trigger_precedence, TriggerPrecedence::MergeModeFirst);
    assert_eq!(config.idle_eviction, Some(Duration::from_secs(900)));
    Ok(())
}

#[test]
fn malformed_documents_are_ignored_by_layered_loader() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let system = dir.path().join("system.json");
    let user = dir.path().join("user.yaml");
    std::fs::write(&system, "{ not json")?;
    std::fs::write(&user, "message_count: [oops\n")?;

    let settings = load_merger_settings_from_paths(&system, &user);
    assert_eq!(settings, MergerSettings::default());
    Ok(())
}

#[test]
fn strict_loader_reports_typed_errors() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;

    let missing = try_load_settings(&dir.path().join("absent.json"));
    assert!(matches!(missing, Err(SettingsError::Read { .. })));

    let json = dir.path().join("bad.json");
    std::fs::write(&json, "[1, 2")?;
    assert!(matches!(
        try_load_settings(&json),
        Err(SettingsError::ParseJson { .. })
    ));

    let yaml = dir.path().join("bad.yaml");
    std::fs::write(&yaml, "message_count: nope\n")?;
    assert!(matches!(
        try_load_settings(&yaml),
        Err(SettingsError::ParseYaml { .. })
    ));

    let toml = dir.path().join("settings.toml");
    std::fs::write(&toml, "message_count = 3\n")?;
    let error = try_load_settings(&toml).expect_err("toml is not supported");
    assert!(matches!(error, SettingsError::UnsupportedFormat { .. }));
    assert!(error.to_string().contains("settings.toml"));
    Ok(())
}

#[test]
fn empty_yaml_file_is_an_empty_document() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("empty.yaml");
    std::fs::write(&path, "\n")?;
    assert_eq!(try_load_settings(&path)?, MergerSettings::default());
    Ok(())
}

#[test]
fn env_overrides_win_and_bad_values_are_ignored() {
    let vars: HashMap<&str, &str> = HashMap::from([
        ("OMNI_MERGER_MERGE_INTERVAL", "2.5"),
        ("OMNI_MERGER_MESSAGE_COUNT", "not-a-number"),
        ("OMNI_MERGER_IDLE_EVICTION_SECS", " 120 "),
    ]);
    let base = MergerSettings {
        message_count: Some(5),
        merge_interval: Some(60.0),
        ..MergerSettings::default()
    };

    let settings = apply_settings_overrides(base, |name| vars.get(name).map(|v| v.to_string()));
    assert_eq!(settings.merge_interval, Some(2.5));
    assert_eq!(settings.message_count, Some(5));
    assert_eq!(settings.idle_eviction_secs, Some(120));
}

#[test]
fn invalid_precedence_falls_back_to_default() {
    let settings = MergerSettings {
        trigger_precedence: Some("whenever".to_string()),
        ..MergerSettings::default()
    };
    assert_eq!(
        MergeConfig::from_settings(&settings).trigger_precedence,
        TriggerPrecedence::TriggersFirst
    );
}
