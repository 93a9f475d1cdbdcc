use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use omni_merger::{
    MergeConfig, MergeEngine, MergerSettings, SharedMergeEngine, StdioOptions,
    apply_settings_overrides, load_merger_settings, load_replay_events, render_help, replay_events,
    run_stdio, try_load_layered_settings, try_load_settings,
};

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Resolve the engine config; malformed settings fall back to defaults.
pub(crate) fn load_config(explicit: Option<&Path>) -> MergeConfig {
    let settings = match explicit {
        Some(path) => {
            let settings = try_load_settings(path).unwrap_or_else(|error| {
                tracing::warn!(
                    path = %path.display(),
                    error = %error,
                    "failed to load merger settings; using defaults"
                );
                MergerSettings::default()
            });
            apply_settings_overrides(settings, env_lookup)
        }
        None => load_merger_settings(),
    };
    MergeConfig::from_settings(&settings)
}

pub(crate) async fn run_stdio_mode(
    config: MergeConfig,
    session_id: Option<String>,
    separator: String,
    sweep_every_secs: u64,
) -> Result<()> {
    if session_id.is_none() && separator.is_empty() {
        bail!("--separator cannot be empty without --session-id");
    }
    tracing::info!(
        message_count = config.message_count,
        merge_interval_secs = config.merge_interval.as_secs_f64(),
        start_triggers = config.start_triggers.len(),
        end_triggers = config.end_triggers.len(),
        instant_triggers = config.instant_triggers.len(),
        trigger_precedence = config.trigger_precedence.as_str(),
        "message merger ready"
    );
    let engine = SharedMergeEngine::new(config);
    let sweeper = engine.spawn_idle_sweeper(Duration::from_secs(sweep_every_secs));
    let result = run_stdio(
        engine,
        StdioOptions {
            session_id,
            separator,
        },
    )
    .await;
    if let Some(handle) = sweeper {
        handle.abort();
    }
    result
}

pub(crate) fn run_replay_mode(config: MergeConfig, file: &Path) -> Result<()> {
    let events = load_replay_events(file)?;
    let mut engine = MergeEngine::new(config);
    for record in replay_events(&mut engine, &events) {
        println!(
            "{}",
            serde_json::to_string(&record).context("failed to encode replay record")?
        );
    }
    Ok(())
}

pub(crate) fn run_usage_mode(config: &MergeConfig) {
    println!("{}", render_help(config));
}

pub(crate) fn run_config_mode(explicit: Option<&Path>, check: bool) -> Result<()> {
    let config = if check {
        let settings = match explicit {
            Some(path) => try_load_settings(path)?,
            None => try_load_layered_settings()?,
        };
        MergeConfig::from_settings(&apply_settings_overrides(settings, env_lookup))
    } else {
        load_config(explicit)
    };
    let rendered =
        serde_yaml::to_string(&config.to_settings()).context("failed to render settings")?;
    print!("{rendered}");
    Ok(())
}
