//! Integration tests for the monitoring engine: strategy fallback,
//! cadence, cancellation, and fault isolation.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::Router;
use clanwatch_core::rank::Rank;
use clanwatch_core::roster::RosterStore;
use clanwatch_monitor::chain::StrategyChain;
use clanwatch_monitor::engine::MonitoringEngine;
use clanwatch_monitor::peer::PeerBotQuery;
use clanwatch_monitor::source::{SourceKind, StatusSource};
use clanwatch_monitor::synthetic::SyntheticFallback;
use clanwatch_monitor::web::WebLookup;
use common::{paused_config, spawn_server, wait_until, Answer, RecordingStore, ScriptedSource};

fn engine_with(store: &Arc<RecordingStore>, source: &Arc<ScriptedSource>) -> MonitoringEngine {
    let source: Arc<dyn StatusSource> = source.clone();
    let store: Arc<dyn RosterStore> = store.clone();
    MonitoringEngine::new(store, StrategyChain::new(vec![source]), paused_config())
}

async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

// ---------------------------------------------------------------------------
// Test: force check answers overrides and persists them
// ---------------------------------------------------------------------------

#[tokio::test]
async fn force_check_applies_identity_overrides() {
    let store = RecordingStore::with_members(&["K.O", "GOAT"]).await;
    let source = Arc::new(ScriptedSource::new(
        SourceKind::PeerBot,
        Answer::Found(Rank::Recruit, false),
    ));
    let engine = engine_with(&store, &source);

    let ko = engine.force_check("K.O").await;
    assert_eq!(ko.source, SourceKind::Override);
    assert_eq!(ko.status.rank, Rank::Captain);
    assert!(ko.status.is_online);
    assert!(ko.persisted);

    let goat = engine.force_check("GOAT").await;
    assert_eq!(goat.status.rank, Rank::MasterSergeant);
    assert!(!goat.status.is_online);

    assert_eq!(source.total_calls(), 0);
    let stored = store.member("GOAT").await.unwrap();
    assert_eq!(stored.rank, Rank::MasterSergeant);
    assert!(!stored.is_online);
}

// ---------------------------------------------------------------------------
// Test: unavailable and failing sources fall back to synthetic data
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upstream_failures_persist_synthetic_status() {
    let store = RecordingStore::with_members(&["Alice", "Bob"]).await;
    let source = Arc::new(
        ScriptedSource::new(SourceKind::PeerBot, Answer::Unavailable).with("Bob", Answer::Fail),
    );
    let engine = engine_with(&store, &source);

    for username in ["Alice", "Bob"] {
        let outcome = engine.force_check(username).await;
        let expected = SyntheticFallback.generate(username);
        assert_eq!(outcome.source, SourceKind::Synthetic);
        assert_eq!(outcome.status, expected);

        let stored = store.member(username).await.unwrap();
        assert_eq!(stored.rank, expected.rank);
        assert_eq!(stored.is_online, expected.is_online);
    }
}

// ---------------------------------------------------------------------------
// Test: force check on a username not in the roster is not persisted
// ---------------------------------------------------------------------------

#[tokio::test]
async fn force_check_reports_unpersisted_member() {
    let store = RecordingStore::with_members(&[]).await;
    let source = Arc::new(ScriptedSource::new(
        SourceKind::Web,
        Answer::Found(Rank::Major, true),
    ));
    let engine = engine_with(&store, &source);

    let outcome = engine.force_check("Ghost").await;
    assert_eq!(outcome.source, SourceKind::Web);
    assert_eq!(outcome.status.rank, Rank::Major);
    assert!(!outcome.persisted);
    assert_eq!(store.write_count(), 0);
}

// ---------------------------------------------------------------------------
// Test: a member is not re-checked before the interval elapses
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn loop_respects_check_interval() {
    let store = RecordingStore::with_members(&["Alice"]).await;
    let source = Arc::new(ScriptedSource::new(
        SourceKind::PeerBot,
        Answer::Found(Rank::Major, true),
    ));
    let engine = engine_with(&store, &source);

    engine.start().await;
    advance(30).await;
    assert_eq!(source.calls_for("Alice"), 1);
    assert_eq!(store.writes_for("Alice"), 1);

    advance(29).await;
    assert_eq!(source.calls_for("Alice"), 1);

    // Force check ignores cadence.
    engine.force_check("Alice").await;
    assert_eq!(source.calls_for("Alice"), 2);

    advance(3).await;
    assert_eq!(source.calls_for("Alice"), 3);

    engine.stop().await;
}

// ---------------------------------------------------------------------------
// Test: members in a pass are paced apart
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn checks_are_paced_within_a_pass() {
    let store = RecordingStore::with_members(&["Alice", "Bob", "Carol"]).await;
    let source = Arc::new(ScriptedSource::new(SourceKind::PeerBot, Answer::Unavailable));
    let engine = engine_with(&store, &source);

    engine.start().await;
    advance(1).await;
    assert_eq!(source.total_calls(), 1);
    advance(2).await;
    assert_eq!(source.total_calls(), 2);
    advance(2).await;
    assert_eq!(source.total_calls(), 3);

    engine.stop().await;
}

// ---------------------------------------------------------------------------
// Test: stopping during the inter-pass sleep ends all writes
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn stop_during_sleep_leaves_no_further_writes() {
    let store = RecordingStore::with_members(&["Alice"]).await;
    let source = Arc::new(ScriptedSource::new(
        SourceKind::PeerBot,
        Answer::Found(Rank::Major, true),
    ));
    let engine = engine_with(&store, &source);

    engine.start().await;
    advance(10).await;
    assert!(engine.is_running().await);
    let writes = store.write_count();
    assert_eq!(writes, 1);

    let started = tokio::time::Instant::now();
    engine.stop().await;
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(!engine.is_running().await);

    advance(600).await;
    assert_eq!(store.write_count(), writes);
}

// ---------------------------------------------------------------------------
// Test: start is idempotent and restart resets cadence
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn start_twice_runs_one_loop_and_restart_rechecks() {
    let store = RecordingStore::with_members(&["Alice"]).await;
    let source = Arc::new(ScriptedSource::new(SourceKind::PeerBot, Answer::Unavailable));
    let engine = engine_with(&store, &source);

    engine.start().await;
    engine.start().await;
    advance(10).await;
    assert_eq!(source.calls_for("Alice"), 1);

    engine.stop().await;
    engine.start().await;
    advance(1).await;
    assert_eq!(source.calls_for("Alice"), 2);

    engine.stop().await;
}

// ---------------------------------------------------------------------------
// Test: a failed roster listing backs off and the loop recovers
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn failed_pass_backs_off_and_resumes() {
    let store = RecordingStore::with_members(&["Alice"]).await;
    store.set_fail_listing(true);
    let source = Arc::new(ScriptedSource::new(SourceKind::PeerBot, Answer::Unavailable));
    let engine = engine_with(&store, &source);

    engine.start().await;
    advance(10).await;
    assert_eq!(source.total_calls(), 0);

    store.set_fail_listing(false);
    advance(19).await;
    assert_eq!(source.total_calls(), 0);

    advance(2).await;
    assert_eq!(source.calls_for("Alice"), 1);
    assert!(engine.is_running().await);

    engine.stop().await;
}

// ---------------------------------------------------------------------------
// Test: a panicking check does not affect other members in the pass
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn panicking_check_is_isolated() {
    let store = RecordingStore::with_members(&["Alice", "Boom", "Carol"]).await;
    let source = Arc::new(
        ScriptedSource::new(SourceKind::PeerBot, Answer::Found(Rank::Major, false))
            .with("Boom", Answer::Panic),
    );
    let engine = engine_with(&store, &source);

    engine.start().await;
    advance(10).await;

    assert_eq!(store.writes_for("Alice"), 1);
    assert_eq!(store.writes_for("Boom"), 0);
    assert_eq!(store.writes_for("Carol"), 1);
    assert!(engine.is_running().await);

    engine.stop().await;
}

// ---------------------------------------------------------------------------
// Test: with no peer and failing stats sites, one pass stores the
// synthetic status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn end_to_end_pass_stores_synthetic_status() {
    let app = Router::new().fallback(|| async { StatusCode::NOT_FOUND });
    let addr = spawn_server(app).await;

    let store = RecordingStore::with_members(&["Alice"]).await;
    let config = common::fast_config();
    let web = WebLookup::new(
        vec![
            format!("http://{addr}/en/player/{{username}}"),
            format!("http://{addr}/search?player={{username}}"),
        ],
        config.web_request_timeout,
    );
    let chain = StrategyChain::standard(PeerBotQuery::disabled(), web);
    let roster: Arc<dyn RosterStore> = store.clone();
    let engine = MonitoringEngine::new(roster, chain, config);

    engine.start().await;
    let stored = wait_until(Duration::from_secs(5), || {
        let store = Arc::clone(&store);
        async move { store.write_count() > 0 }
    })
    .await;
    engine.stop().await;
    assert!(stored, "Alice was never checked");

    let expected = SyntheticFallback.generate("Alice");
    let alice = store.member("Alice").await.unwrap();
    assert_eq!(alice.rank, expected.rank);
    assert_eq!(alice.is_online, expected.is_online);
    assert_eq!(store.writes()[0], ("Alice".to_string(), expected.rank, expected.is_online));
}

// ---------------------------------------------------------------------------
// Test: the roster write matches usernames exactly
// ---------------------------------------------------------------------------

#[tokio::test]
async fn force_check_write_matches_username_exactly() {
    let store = RecordingStore::with_members(&["Alice"]).await;
    let source = Arc::new(ScriptedSource::new(SourceKind::PeerBot, Answer::Unavailable));
    let engine = engine_with(&store, &source);

    let outcome = engine.force_check("alice").await;
    assert_eq!(outcome.status, SyntheticFallback.generate("alice"));
    assert!(!outcome.persisted);
}
