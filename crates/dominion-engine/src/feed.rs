//! Bus subscribers that mirror the session into the log.
//!
//! The engine has no UI, so the event feed and battle reports are written
//! to the tracing output instead.

use dominion_core::GameSession;
use dominion_events::{Notification, SubscriptionId, Topic};
use dominion_types::{EventId, GameEvent};
use tracing::info;

/// Tracks which events of the feed have already been logged.
///
/// `events_updated` always carries the whole (capped) log, so each delivery
/// is scanned for events newer than the last one seen.
#[derive(Debug, Default)]
pub struct FeedCursor {
    last_seen: Option<EventId>,
}

impl FeedCursor {
    /// The events in `feed` that come after the last one seen, oldest
    /// first. Advances the cursor.
    pub fn fresh<'a>(&mut self, feed: &'a [GameEvent]) -> &'a [GameEvent] {
        let start = self
            .last_seen
            .and_then(|seen| feed.iter().position(|e| e.id == seen))
            .map_or(0, |idx| idx.saturating_add(1));
        if let Some(last) = feed.last() {
            self.last_seen = Some(last.id);
        }
        feed.get(start..).unwrap_or_default()
    }
}

/// Subscribe the log feed to `session`. Returns the two subscription ids.
pub fn attach(session: &mut GameSession) -> [SubscriptionId; 2] {
    let mut cursor = FeedCursor::default();
    let events = session.subscribe(Topic::EventsUpdated, move |notification| {
        if let Notification::EventsUpdated(feed) = notification {
            for event in cursor.fresh(feed) {
                info!(
                    event_type = event.event_type.as_str(),
                    source = %event.source_player_id,
                    "{}",
                    event.message
                );
            }
        }
        Ok(())
    });

    let battles = session.subscribe(Topic::BattleResult, |notification| {
        if let Notification::BattleResult(result) = notification {
            info!(
                battle = %result.id,
                territory = %result.territory_id,
                outcome = ?result.outcome,
                change = result.territory_control_change,
                "battle report\n{}",
                result.details
            );
        }
        Ok(())
    });

    [events, battles]
}
