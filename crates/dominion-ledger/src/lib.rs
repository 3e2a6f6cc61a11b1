//! Player resource ledger for the Dominion simulation.
//!
//! Every change to a player's wallet goes through this crate. A charge is
//! all-or-nothing: if any resource in the price would go negative, nothing
//! is deducted and the caller gets [`LedgerError::InsufficientFunds`].
//!
//! # Architecture
//!
//! - [`ledger`] -- The [`PlayerLedger`]: balances plus an append-only log of
//!   every charge, payout and trade leg.
//! - [`reconcile`] -- Replays the log from the opening balances and checks
//!   that it lands on the current balances.
//!
//! # Usage
//!
//! ```
//! use chrono::Utc;
//! use dominion_ledger::PlayerLedger;
//! use dominion_types::{Player, PlayerId, Resources};
//!
//! let alice = Player {
//!     id: PlayerId::new("alice"),
//!     name: "Alice".to_owned(),
//!     faction: "Neon Syndicate".to_owned(),
//!     resources: Resources::credits(120),
//! };
//! let mut ledger = PlayerLedger::new(vec![alice]).ok();
//! let ledger = ledger.as_mut();
//! let id = PlayerId::new("alice");
//!
//! if let Some(ledger) = ledger {
//!     assert!(ledger.charge(&id, &Resources::credits(100), "claim", Utc::now()).is_ok());
//!     // A second claim would overdraw, so nothing is taken.
//!     assert!(ledger.charge(&id, &Resources::credits(100), "claim", Utc::now()).is_err());
//!     assert!(ledger.reconcile().is_ok());
//! }
//! ```

pub mod ledger;
pub mod reconcile;

pub use ledger::{EntryKind, LedgerEntry, PlayerLedger, TradeLegs};

use dominion_types::{PlayerId, Resources};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur when moving resources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// No player with this id is registered.
    #[error("unknown player: {0}")]
    UnknownPlayer(PlayerId),

    /// A player id appeared twice in the initial roster.
    #[error("duplicate player id: {0}")]
    DuplicatePlayer(PlayerId),

    /// The player cannot cover the full price.
    #[error("player {player} needs {required} but holds {available}")]
    InsufficientFunds {
        /// The player being charged.
        player: PlayerId,
        /// The full price.
        required: Resources,
        /// The player's balance at the time of the attempt.
        available: Resources,
    },

    /// A credit would overflow a balance.
    #[error("balance overflow for player {0}")]
    Overflow(PlayerId),
}

// ---------------------------------------------------------------------------
// Anomaly type
// ---------------------------------------------------------------------------

/// A mismatch between a player's balance and the replayed ledger log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAnomaly {
    /// The player whose books do not balance.
    pub player: PlayerId,
    /// Balance obtained by replaying the log.
    pub replayed: Option<Resources>,
    /// Balance currently stored.
    pub recorded: Resources,
    /// Human-readable description.
    pub message: String,
}

impl core::fmt::Display for LedgerAnomaly {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message)
    }
}
