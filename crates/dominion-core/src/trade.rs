//! Player-to-player trade offers.
//!
//! An offer is a `trade_offer` event with status pending. The proposer
//! must be able to cover the offered side when proposing, but nothing is
//! held in escrow: both sides are checked again when the target accepts,
//! and the swap is all-or-nothing. Every later event in the thread carries
//! the offer's id in `thread_id`.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use dominion_events::Topic;
use dominion_ledger::{LedgerError, TradeLegs};
use dominion_types::{EventId, EventStatus, EventType, GameEvent, PlayerId, Resources};

use crate::error::ActionError;
use crate::scheduler::Effect;
use crate::session::GameSession;

/// An open offer awaiting an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeOffer {
    /// Id of the `trade_offer` event; also the thread id.
    pub id: EventId,
    /// Proposer.
    pub from: PlayerId,
    /// Target.
    pub to: PlayerId,
    /// What the proposer gives.
    pub offered: Resources,
    /// What the proposer asks for.
    pub requested: Resources,
    /// When the offer lapses.
    pub expires_at: DateTime<Utc>,
}

impl GameSession {
    /// Offer `offered` to `to` in exchange for `requested`.
    ///
    /// Returns the pending `trade_offer` event. The offer expires after the
    /// configured trade lifetime.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown player, `InvalidState` for a self-trade or
    /// an empty offer, `InsufficientResources` if `from` cannot cover
    /// `offered`.
    pub fn propose_trade(
        &mut self,
        from: &PlayerId,
        to: &PlayerId,
        offered: Resources,
        requested: Resources,
    ) -> Result<GameEvent, ActionError> {
        if from == to {
            return Err(ActionError::SelfTrade(from.clone()));
        }
        if offered.is_zero() && requested.is_zero() {
            return Err(ActionError::EmptyTrade);
        }
        if !self.players.contains(to) {
            return Err(LedgerError::UnknownPlayer(to.clone()).into());
        }
        self.players.ensure_affordable(from, &offered)?;

        let expires_at = self.after(self.rules.trade_expiry);
        let message = format!(
            "{} offers {offered} to {} for {requested}",
            self.player_name(from),
            self.player_name(to)
        );
        let mut event = GameEvent::completed(EventType::TradeOffer, from.clone(), message, self.now)
            .with_target(to.clone())
            .with_resources(&offered);
        event.status = EventStatus::Pending;
        event.expires_at = Some(expires_at);

        self.trades.insert(
            event.id,
            TradeOffer {
                id: event.id,
                from: from.clone(),
                to: to.clone(),
                offered,
                requested,
                expires_at,
            },
        );
        self.timers.schedule(expires_at, Effect::ExpireTrade(event.id));
        info!(offer = %event.id, from = %from, to = %to, "trade offered");

        self.log_event(event.clone());
        self.notify(&[Topic::EventsUpdated]);
        Ok(event)
    }

    /// Accept or reject an open offer as its target.
    ///
    /// On accept the two sides are swapped atomically. Returns the
    /// `trade_accepted` or `trade_rejected` event.
    ///
    /// # Errors
    ///
    /// `NotFound` if no open offer has this id (lapsed offers are removed
    /// by their expiry timer), `NotOwner` if `responder` is not the target,
    /// `InsufficientResources` if either side can no longer pay (the offer
    /// stays open).
    pub fn respond_to_trade(
        &mut self,
        offer_id: EventId,
        responder: &PlayerId,
        accept: bool,
    ) -> Result<GameEvent, ActionError> {
        let offer = self
            .trades
            .get(&offer_id)
            .cloned()
            .ok_or(ActionError::TradeNotFound(offer_id))?;
        if &offer.to != responder {
            return Err(ActionError::NotTradeTarget {
                offer: offer_id,
                player: responder.clone(),
            });
        }

        if accept {
            let legs = TradeLegs {
                first: offer.from.clone(),
                first_gives: offer.offered,
                second: offer.to.clone(),
                second_gives: offer.requested,
            };
            self.players
                .swap(&legs, &format!("trade {offer_id}"), self.now)?;
        }
        self.trades.remove(&offer_id);

        let (event_type, status, verb) = if accept {
            (EventType::TradeAccepted, EventStatus::Accepted, "accepted")
        } else {
            (EventType::TradeRejected, EventStatus::Rejected, "rejected")
        };
        let message = format!(
            "{} {verb} the trade from {}",
            self.player_name(responder),
            self.player_name(&offer.from)
        );
        let mut event = GameEvent::completed(event_type, responder.clone(), message, self.now)
            .with_target(offer.from.clone())
            .with_resources(&offer.offered);
        event.status = status;
        event.thread_id = Some(offer_id);
        info!(offer = %offer_id, responder = %responder, accept, "trade answered");

        self.log_event(event.clone());
        if accept {
            self.notify(&[Topic::PlayersUpdated, Topic::PlayerUpdated]);
        }
        self.notify(&[Topic::EventsUpdated]);
        Ok(event)
    }

    /// Open offers in id order.
    pub fn pending_trades(&self) -> impl Iterator<Item = &TradeOffer> {
        self.trades.values()
    }

    pub(crate) fn expire_trade(&mut self, offer_id: EventId) {
        let Some(offer) = self.trades.remove(&offer_id) else {
            return;
        };
        debug!(offer = %offer_id, "trade expired");
        let message = format!(
            "Trade offer from {} to {} expired",
            self.player_name(&offer.from),
            self.player_name(&offer.to)
        );
        let mut event =
            GameEvent::completed(EventType::TradeExpired, offer.from.clone(), message, self.now)
                .with_target(offer.to);
        event.status = EventStatus::Rejected;
        event.thread_id = Some(offer_id);

        self.log_event(event);
        self.notify(&[Topic::EventsUpdated]);
    }
}
