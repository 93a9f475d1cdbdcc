//! Async tests: SharedMergeEngine per-session locking, host message flow and idle eviction.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use omni_merger::{BufferSnapshot, Decision, InboundMessage, MergeConfig, SharedMergeEngine};

fn at(secs: u64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(secs)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sessions_never_mix_lines() -> anyhow::Result<()> {
    let engine = SharedMergeEngine::new(
        MergeConfig::default()
            .with_instant_triggers(["#now"])
            .with_message_count(1_000),
    );

    let mut tasks = Vec::new();
    for session in 0..8 {
        let engine = engine.clone();
        tasks.push(tokio::spawn(async move {
            let session_id = format!("session-{session}");
            for idx in 0..50 {
                let text = format!("{session_id}:{idx}");
                let decision = engine.handle(&session_id, &text, at(idx)).await;
                assert_eq!(decision, Decision::Suppress);
                tokio::task::yield_now().await;
            }
            let flushed = engine.handle(&session_id, "#now", at(50)).await;
            (session_id, flushed)
        }));
    }

    for task in tasks {
        let (session_id, decision) = task.await?;
        let merged = decision.into_merged_text().expect("instant trigger should emit");
        let lines: Vec<&str> = merged.lines().collect();
        assert_eq!(lines.len(), 51);
        for (idx, line) in lines.iter().take(50).enumerate() {
            assert_eq!(*line, format!("{session_id}:{idx}"));
        }
        assert_eq!(lines[50], "#now");
    }
    assert_eq!(engine.session_count(), 8);
    Ok(())
}

#[tokio::test]
async fn shared_engine_matches_count_semantics() {
    let engine = SharedMergeEngine::new(MergeConfig::default().with_message_count(3));
    assert_eq!(engine.handle("s1", "a", at(0)).await, Decision::Suppress);
    assert_eq!(engine.handle("s1", "b", at(1)).await, Decision::Suppress);
    assert_eq!(
        engine.handle("s1", "c", at(2)).await,
        Decision::Emit("a\nb\nc".to_string())
    );
    assert_eq!(
        engine.snapshot("s1").await,
        Some(BufferSnapshot {
            lines: Vec::new(),
            merging: false,
        })
    );
}

#[tokio::test]
async fn process_substitutes_content_on_emit() {
    let engine = SharedMergeEngine::new(
        MergeConfig::default()
            .with_start_triggers(["#merge_start"])
            .with_end_triggers(["#merge_end"]),
    );
    assert!(
        engine
            .process(InboundMessage::new("chat:1", "#merge_start").at(0))
            .await
            .is_none()
    );
    assert!(
        engine
            .process(InboundMessage::new("chat:1", "x").at(1))
            .await
            .is_none()
    );
    assert_eq!(
        engine.snapshot("chat:1").await,
        Some(BufferSnapshot {
            lines: vec!["x".to_string()],
            merging: true,
        })
    );

    let forwarded = engine
        .process(InboundMessage::new("chat:1", "#merge_end").at(2))
        .await
        .expect("end trigger should forward");
    assert_eq!(forwarded.session_id, "chat:1");
    assert_eq!(forwarded.content, "x");
}

#[tokio::test]
async fn end_and_instant_on_unknown_session_do_not_create_state() {
    let engine = SharedMergeEngine::new(
        MergeConfig::default()
            .with_end_triggers(["#end"])
            .with_instant_triggers(["#now"]),
    );
    assert_eq!(engine.handle("ghost", "#end", at(0)).await, Decision::Suppress);
    assert_eq!(engine.handle("ghost", "#now", at(0)).await, Decision::Suppress);
    assert_eq!(engine.session_count(), 0);
    assert_eq!(engine.snapshot("ghost").await, None);
}

#[tokio::test]
async fn evict_idle_removes_only_stale_sessions() {
    let engine = SharedMergeEngine::new(MergeConfig::default());
    engine.handle("old", "x", at(0)).await;
    engine.handle("recent", "y", at(900)).await;

    assert_eq!(engine.evict_idle(at(1_000), Duration::from_secs(600)), 1);
    assert_eq!(engine.snapshot("old").await, None);
    assert!(engine.snapshot("recent").await.is_some());

    // An evicted session starts over from an empty buffer.
    engine.handle("old", "z", at(1_001)).await;
    assert_eq!(
        engine.snapshot("old").await.map(|snapshot| snapshot.lines),
        Some(vec!["z".to_string()])
    );
}

#[tokio::test]
async fn reset_drops_session_state() {
    let engine = SharedMergeEngine::default();
    engine.handle("s1", "x", at(0)).await;
    assert!(engine.reset("s1"));
    assert!(!engine.reset("s1"));
    assert_eq!(engine.session_count(), 0);
}

#[tokio::test]
async fn sweeper_is_disabled_without_idle_eviction() {
    let engine = SharedMergeEngine::default();
    assert!(engine.spawn_idle_sweeper(Duration::from_secs(1)).is_none());

    let engine = SharedMergeEngine::new(
        MergeConfig::default().with_idle_eviction(Some(Duration::from_secs(30))),
    );
    let handle = engine
        .spawn_idle_sweeper(Duration::from_secs(1))
        .expect("sweeper should start when idle eviction is configured");
    handle.abort();
}
