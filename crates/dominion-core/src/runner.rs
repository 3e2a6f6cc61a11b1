//! Async session loop.
//!
//! [`run_session`] drives a shared [`GameSession`] against wall time: on
//! every poll it locks the session, advances the session clock by the time
//! elapsed since the loop started, and hands the session to a
//! [`PollCallback`]. The mutex is the single writer guard; outside callers
//! issue commands through the same lock between polls.
//!
//! The loop ends on a shutdown signal or when the configured maximum
//! runtime has elapsed. On exit the session is torn down, cancelling every
//! pending timer.

use std::sync::Arc;

use chrono::TimeDelta;
use tokio::sync::{Mutex, watch};
use tokio::time::{Duration, Instant, MissedTickBehavior};
use tracing::info;

use crate::config::RunnerConfig;
use crate::session::GameSession;

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEndReason {
    /// The shutdown signal fired (or its sender was dropped).
    Shutdown,
    /// `runner.max_runtime_secs` elapsed.
    MaxRuntimeReached,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Why the loop stopped.
    pub end_reason: SessionEndReason,
    /// Number of polls executed.
    pub polls: u64,
    /// Effects fired across all polls.
    pub effects_fired: u64,
    /// Timers cancelled at teardown.
    pub cancelled: usize,
}

/// Callback invoked after each poll, with the session still locked.
pub trait PollCallback: Send {
    /// Called after the session clock has been advanced.
    fn on_poll(&mut self, fired: usize, session: &GameSession);
}

/// A callback that does nothing.
pub struct NoOpCallback;

impl PollCallback for NoOpCallback {
    fn on_poll(&mut self, _fired: usize, _session: &GameSession) {}
}

/// Run the session until shutdown or the runtime limit.
pub async fn run_session(
    session: Arc<Mutex<GameSession>>,
    config: &RunnerConfig,
    mut shutdown: watch::Receiver<bool>,
    callback: &mut dyn PollCallback,
) -> RunSummary {
    let origin = session.lock().await.now();
    let started = Instant::now();
    let limit = config.max_runtime_secs.map(Duration::from_secs);
    let mut interval = tokio::time::interval(Duration::from_millis(config.poll_interval_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut polls: u64 = 0;
    let mut effects_fired: u64 = 0;

    info!(
        poll_interval_ms = config.poll_interval_ms,
        max_runtime_secs = config.max_runtime_secs,
        "session loop starting"
    );

    let end_reason = loop {
        if *shutdown.borrow() {
            break SessionEndReason::Shutdown;
        }
        if limit.is_some_and(|limit| started.elapsed() >= limit) {
            break SessionEndReason::MaxRuntimeReached;
        }

        tokio::select! {
            _ = interval.tick() => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break SessionEndReason::Shutdown;
                }
                continue;
            }
        }

        let elapsed = TimeDelta::from_std(started.elapsed()).unwrap_or(TimeDelta::MAX);
        let target = origin.checked_add_signed(elapsed).unwrap_or(origin);

        let mut guard = session.lock().await;
        let fired = guard.advance_to(target);
        callback.on_poll(fired, &guard);
        drop(guard);

        polls = polls.saturating_add(1);
        effects_fired = effects_fired.saturating_add(u64::try_from(fired).unwrap_or(u64::MAX));
    };

    let cancelled = session.lock().await.shutdown();
    let summary = RunSummary {
        end_reason,
        polls,
        effects_fired,
        cancelled,
    };
    info!(
        reason = ?summary.end_reason,
        polls = summary.polls,
        effects_fired = summary.effects_fired,
        cancelled = summary.cancelled,
        "session loop ended"
    );
    summary
}
