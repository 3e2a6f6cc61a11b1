//! The event bus: topic-keyed handler registry with synchronous fan-out.
//!
//! A handler that returns an error or panics is logged and skipped; the
//! remaining handlers for the topic still run. Late subscribers do not see
//! earlier notifications.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{trace, warn};

use crate::topic::{Notification, Topic};

/// Failure reported by a subscriber.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("handler failed: {0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    /// Build an error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Opaque token identifying one subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

/// A boxed subscriber callback.
pub type Handler = Box<dyn FnMut(&Notification) -> Result<(), HandlerError> + Send>;

/// Tally of one [`EventBus::publish`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Handlers that returned `Ok`.
    pub delivered: usize,
    /// Handlers that returned an error or panicked.
    pub failed: usize,
}

/// Topic-keyed registry of subscribers.
pub struct EventBus {
    handlers: BTreeMap<Topic, Vec<(SubscriptionId, Handler)>>,
    next_id: u64,
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub const fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Register `handler` for `topic`.
    ///
    /// Handlers for the same topic run in the order they were registered.
    pub fn subscribe<F>(&mut self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&Notification) -> Result<(), HandlerError> + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.handlers
            .entry(topic)
            .or_default()
            .push((id, Box::new(handler)));
        trace!(%topic, subscription = id.0, "subscribed");
        id
    }

    /// Remove a subscription. Returns `false` if the token was unknown or
    /// already removed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for handlers in self.handlers.values_mut() {
            if let Some(pos) = handlers.iter().position(|(sid, _)| *sid == id) {
                drop(handlers.remove(pos));
                trace!(subscription = id.0, "unsubscribed");
                return true;
            }
        }
        false
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.handlers.get(&topic).map_or(0, Vec::len)
    }

    /// Deliver `notification` to every subscriber of its topic.
    pub fn publish(&mut self, notification: &Notification) -> Delivery {
        let topic = notification.topic();
        let mut delivery = Delivery::default();
        let Some(handlers) = self.handlers.get_mut(&topic) else {
            return delivery;
        };

        for (id, handler) in handlers.iter_mut() {
            match catch_unwind(AssertUnwindSafe(|| handler(notification))) {
                Ok(Ok(())) => delivery.delivered = delivery.delivered.saturating_add(1),
                Ok(Err(err)) => {
                    warn!(%topic, subscription = id.0, error = %err, "subscriber returned an error");
                    delivery.failed = delivery.failed.saturating_add(1);
                }
                Err(payload) => {
                    let message = payload
                        .downcast_ref::<&str>()
                        .map(|s| (*s).to_owned())
                        .or_else(|| payload.downcast_ref::<String>().cloned())
                        .unwrap_or_else(|| String::from("non-string panic payload"));
                    warn!(%topic, subscription = id.0, panic = %message, "subscriber panicked");
                    delivery.failed = delivery.failed.saturating_add(1);
                }
            }
        }
        delivery
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let counts: BTreeMap<Topic, usize> =
            self.handlers.iter().map(|(t, h)| (*t, h.len())).collect();
        f.debug_struct("EventBus")
            .field("subscribers", &counts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use dominion_types::{
        BattleId, BattleOutcome, BattleResult, PlayerId, TerritoryId,
    };

    use super::*;

    fn battle() -> Notification {
        Notification::BattleResult(BattleResult {
            id: BattleId::new(),
            territory_id: TerritoryId(1),
            attacker_id: PlayerId::new("a"),
            defender_id: PlayerId::new("d"),
            attacker_agent_ids: vec![],
            defender_agent_ids: vec![],
            outcome: BattleOutcome::Draw,
            territory_control_change: 5,
            attacker_power: 1.into(),
            defender_power: 1.into(),
            timestamp: Utc::now(),
            details: String::new(),
        })
    }

    fn recorder(log: &Arc<Mutex<Vec<&'static str>>>, tag: &'static str) -> Handler {
        let log = Arc::clone(log);
        Box::new(move |_| {
            log.lock().unwrap().push(tag);
            Ok(())
        })
    }

    #[test]
    fn delivers_in_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(Topic::BattleResult, recorder(&log, "first"));
        bus.subscribe(Topic::BattleResult, recorder(&log, "second"));
        bus.subscribe(Topic::AgentsUpdated, recorder(&log, "other topic"));

        let delivery = bus.publish(&battle());

        assert_eq!(delivery, Delivery { delivered: 2, failed: 0 });
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn failing_handlers_do_not_block_the_rest() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        bus.subscribe(Topic::BattleResult, |_| Err(HandlerError::new("disk full")));
        bus.subscribe(Topic::BattleResult, |_| panic!("subscriber bug"));
        bus.subscribe(Topic::BattleResult, recorder(&log, "survivor"));

        let delivery = bus.publish(&battle());

        assert_eq!(delivery, Delivery { delivered: 1, failed: 2 });
        assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
    }

    #[test]
    fn unsubscribe_by_token() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        let gone = bus.subscribe(Topic::BattleResult, recorder(&log, "gone"));
        bus.subscribe(Topic::BattleResult, recorder(&log, "kept"));

        assert!(bus.unsubscribe(gone));
        assert!(!bus.unsubscribe(gone));
        assert_eq!(bus.subscriber_count(Topic::BattleResult), 1);

        bus.publish(&battle());
        assert_eq!(*log.lock().unwrap(), vec!["kept"]);
    }

    #[test]
    fn publish_without_subscribers_is_quiet() {
        let mut bus = EventBus::new();
        assert_eq!(bus.publish(&battle()), Delivery::default());
    }
}
