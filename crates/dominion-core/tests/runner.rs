//! Tests for the async session loop, run on paused tokio time.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tokio::time::{Duration, sleep};

use dominion_core::{
    GameConfig, GameSession, NoOpCallback, PollCallback, SessionEndReason, run_session,
};
use dominion_types::{AgentStatus, AgentType, PlayerId, TerritoryId};

fn quiet_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.rivals.enabled = false;
    config
}

#[derive(Default)]
struct Counter {
    polls: u64,
    fired: usize,
}

impl PollCallback for Counter {
    fn on_poll(&mut self, fired: usize, _session: &GameSession) {
        self.polls = self.polls.saturating_add(1);
        self.fired = self.fired.saturating_add(fired);
    }
}

#[tokio::test(start_paused = true)]
async fn loop_stops_at_max_runtime_and_fires_timers() {
    let mut config = quiet_config();
    config.runner.max_runtime_secs = Some(5);
    let mut session = GameSession::from_config(&config, Utc::now()).unwrap();
    let agent = session
        .deploy_agent(&PlayerId::new("player-1"), AgentType::Scout, TerritoryId(1), "Reconnaissance")
        .unwrap()
        .id;
    let session = Arc::new(Mutex::new(session));
    let (_tx, rx) = watch::channel(false);
    let mut counter = Counter::default();

    let summary = run_session(Arc::clone(&session), &config.runner, rx, &mut counter).await;

    assert_eq!(summary.end_reason, SessionEndReason::MaxRuntimeReached);
    assert!(summary.polls > 0);
    assert_eq!(summary.polls, counter.polls);
    assert_eq!(summary.effects_fired, 1);
    assert_eq!(counter.fired, 1);

    let guard = session.lock().await;
    assert_eq!(guard.agent(agent).unwrap().status, AgentStatus::Active);
    assert_eq!(guard.scheduled_effects(), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_signal_ends_loop_and_cancels_timers() {
    let config = GameConfig::default();
    let session = GameSession::from_config(&config, Utc::now()).unwrap();
    let session = Arc::new(Mutex::new(session));
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();
    });
    let summary = run_session(Arc::clone(&session), &config.runner, rx, &mut NoOpCallback).await;

    assert_eq!(summary.end_reason, SessionEndReason::Shutdown);
    // The first world tick was still pending at five seconds.
    assert_eq!(summary.cancelled, 1);
    assert_eq!(session.lock().await.scheduled_effects(), 0);
}

#[tokio::test(start_paused = true)]
async fn dropped_sender_counts_as_shutdown() {
    let config = quiet_config();
    let session = GameSession::from_config(&config, Utc::now()).unwrap();
    let (tx, rx) = watch::channel(false);
    drop(tx);

    let summary = run_session(Arc::new(Mutex::new(session)), &config.runner, rx, &mut NoOpCallback).await;

    assert_eq!(summary.end_reason, SessionEndReason::Shutdown);
    assert_eq!(summary.cancelled, 0);
}
