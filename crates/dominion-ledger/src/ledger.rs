//! The player ledger: balances plus an append-only movement log.
//!
//! # Design
//!
//! - **All-or-nothing**: a charge checks every resource before touching any.
//! - **Append-only**: log entries are never modified or deleted.
//! - **Unsigned**: balances are `u64`, so a negative balance is
//!   unrepresentable; overdraws are rejected instead.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use dominion_types::{Player, PlayerId, Resources};

use crate::LedgerError;

/// Direction and purpose of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Resources paid for an action (claim, deploy).
    Charge,
    /// Resources granted by the world (extraction).
    Payout,
    /// Resources handed to another player in a trade.
    TradeOut,
    /// Resources received from another player in a trade.
    TradeIn,
}

impl EntryKind {
    /// Whether this entry adds to the balance.
    pub const fn is_credit(self) -> bool {
        matches!(self, Self::Payout | Self::TradeIn)
    }
}

/// One recorded wallet movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Position in the log, starting at 0.
    pub seq: u64,
    /// Whose wallet moved.
    pub player_id: PlayerId,
    /// Direction and purpose.
    pub kind: EntryKind,
    /// Quantities moved.
    pub amount: Resources,
    /// Short label, e.g. `"claim"` or `"deploy scout"`.
    pub reason: String,
    /// Session time of the movement.
    pub at: DateTime<Utc>,
}

/// The two sides of a resource swap between players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeLegs {
    /// First party.
    pub first: PlayerId,
    /// What the first party hands over.
    pub first_gives: Resources,
    /// Second party.
    pub second: PlayerId,
    /// What the second party hands over.
    pub second_gives: Resources,
}

/// Authoritative per-player wallets.
#[derive(Debug, Clone, Default)]
pub struct PlayerLedger {
    /// Players keyed by id.
    players: BTreeMap<PlayerId, Player>,
    /// Balances at construction, the replay starting point.
    opening: BTreeMap<PlayerId, Resources>,
    /// All movements, in order.
    entries: Vec<LedgerEntry>,
}

impl PlayerLedger {
    /// Build a ledger from the initial roster.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::DuplicatePlayer`] if two players share an id.
    pub fn new(players: Vec<Player>) -> Result<Self, LedgerError> {
        let mut ledger = Self::default();
        for player in players {
            if ledger.players.contains_key(&player.id) {
                return Err(LedgerError::DuplicatePlayer(player.id));
            }
            ledger.opening.insert(player.id.clone(), player.resources);
            ledger.players.insert(player.id.clone(), player);
        }
        Ok(ledger)
    }

    /// Look up a player.
    pub fn get(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }

    /// Whether a player with this id exists.
    pub fn contains(&self, id: &PlayerId) -> bool {
        self.players.contains_key(id)
    }

    /// All players, ordered by id.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    /// Number of registered players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Whether no players are registered.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Current balance of a player.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownPlayer`] if the id is not registered.
    pub fn balance(&self, id: &PlayerId) -> Result<Resources, LedgerError> {
        self.players
            .get(id)
            .map(|p| p.resources)
            .ok_or_else(|| LedgerError::UnknownPlayer(id.clone()))
    }

    /// Check that a player could pay `cost` without charging anything.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownPlayer`] or
    /// [`LedgerError::InsufficientFunds`].
    pub fn ensure_affordable(&self, id: &PlayerId, cost: &Resources) -> Result<(), LedgerError> {
        let available = self.balance(id)?;
        if available.covers(cost) {
            Ok(())
        } else {
            Err(LedgerError::InsufficientFunds {
                player: id.clone(),
                required: *cost,
                available,
            })
        }
    }

    /// Deduct `cost` from a player's wallet.
    ///
    /// Nothing is deducted unless every resource can be covered.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownPlayer`] or
    /// [`LedgerError::InsufficientFunds`].
    pub fn charge(
        &mut self,
        id: &PlayerId,
        cost: &Resources,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<&Player, LedgerError> {
        let available = self.balance(id)?;
        let remaining =
            available
                .checked_sub(cost)
                .ok_or_else(|| LedgerError::InsufficientFunds {
                    player: id.clone(),
                    required: *cost,
                    available,
                })?;
        self.set_balance(id, remaining)?;
        self.record(id, EntryKind::Charge, *cost, reason, at);
        debug!(player = %id, %cost, reason, "charged");
        self.players
            .get(id)
            .ok_or_else(|| LedgerError::UnknownPlayer(id.clone()))
    }

    /// Add `amount` to a player's wallet.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownPlayer`] or [`LedgerError::Overflow`].
    pub fn credit(
        &mut self,
        id: &PlayerId,
        amount: &Resources,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<&Player, LedgerError> {
        let current = self.balance(id)?;
        let updated = current
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Overflow(id.clone()))?;
        self.set_balance(id, updated)?;
        self.record(id, EntryKind::Payout, *amount, reason, at);
        debug!(player = %id, %amount, reason, "credited");
        self.players
            .get(id)
            .ok_or_else(|| LedgerError::UnknownPlayer(id.clone()))
    }

    /// Swap resources between two players atomically.
    ///
    /// Both parties must cover their side; if either cannot, neither wallet
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownPlayer`],
    /// [`LedgerError::InsufficientFunds`] naming the first party that cannot
    /// pay, or [`LedgerError::Overflow`].
    pub fn swap(
        &mut self,
        legs: &TradeLegs,
        reason: &str,
        at: DateTime<Utc>,
    ) -> Result<(), LedgerError> {
        let first_balance = self.balance(&legs.first)?;
        let second_balance = self.balance(&legs.second)?;

        let first_after = first_balance
            .checked_sub(&legs.first_gives)
            .ok_or_else(|| LedgerError::InsufficientFunds {
                player: legs.first.clone(),
                required: legs.first_gives,
                available: first_balance,
            })?
            .checked_add(&legs.second_gives)
            .ok_or_else(|| LedgerError::Overflow(legs.first.clone()))?;
        let second_after = second_balance
            .checked_sub(&legs.second_gives)
            .ok_or_else(|| LedgerError::InsufficientFunds {
                player: legs.second.clone(),
                required: legs.second_gives,
                available: second_balance,
            })?
            .checked_add(&legs.first_gives)
            .ok_or_else(|| LedgerError::Overflow(legs.second.clone()))?;

        self.set_balance(&legs.first, first_after)?;
        self.set_balance(&legs.second, second_after)?;

        self.record(&legs.first, EntryKind::TradeOut, legs.first_gives, reason, at);
        self.record(&legs.second, EntryKind::TradeIn, legs.first_gives, reason, at);
        self.record(&legs.second, EntryKind::TradeOut, legs.second_gives, reason, at);
        self.record(&legs.first, EntryKind::TradeIn, legs.second_gives, reason, at);
        debug!(first = %legs.first, second = %legs.second, reason, "swapped");
        Ok(())
    }

    /// All movements in the order they happened.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Opening balance of a player, as supplied at construction.
    pub fn opening_balance(&self, id: &PlayerId) -> Option<Resources> {
        self.opening.get(id).copied()
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn set_balance(&mut self, id: &PlayerId, balance: Resources) -> Result<(), LedgerError> {
        let player = self
            .players
            .get_mut(id)
            .ok_or_else(|| LedgerError::UnknownPlayer(id.clone()))?;
        player.resources = balance;
        Ok(())
    }

    fn record(
        &mut self,
        id: &PlayerId,
        kind: EntryKind,
        amount: Resources,
        reason: &str,
        at: DateTime<Utc>,
    ) {
        if amount.is_zero() {
            return;
        }
        let seq = u64::try_from(self.entries.len()).unwrap_or(u64::MAX);
        self.entries.push(LedgerEntry {
            seq,
            player_id: id.clone(),
            kind,
            amount,
            reason: reason.to_owned(),
            at,
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
