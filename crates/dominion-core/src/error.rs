//! Error types for session commands.
//!
//! Every command returns [`ActionError`] on rejection. A rejected command
//! leaves all ledgers untouched. Callers that only care about the category
//! use [`ActionError::kind`].

use dominion_agents::AgentError;
use dominion_ledger::LedgerError;
use dominion_types::{EventId, PlayerId, TerritoryId};
use dominion_world::WorldError;

/// Coarse category of a rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The action is not legal for the entity's current state.
    InvalidState,
    /// The price exceeds the player's balance.
    InsufficientResources,
    /// An id referenced by the command does not exist.
    NotFound,
    /// The caller does not own the entity it acted on.
    NotOwner,
}

/// Errors returned by [`GameSession`](crate::session::GameSession) commands.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// Player ledger rejected the operation.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Territory ledger rejected the operation.
    #[error(transparent)]
    World(#[from] WorldError),

    /// Agent registry rejected the operation.
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Attacks need a defender; neutral territory is claimed instead.
    #[error("territory {0} is neutral and cannot be attacked")]
    NeutralTarget(TerritoryId),

    /// A player attacked their own territory.
    #[error("player {player} already holds territory {territory}")]
    OwnTerritory {
        /// The territory.
        territory: TerritoryId,
        /// The attacker and holder.
        player: PlayerId,
    },

    /// Extraction from a territory held by someone else.
    #[error("territory {territory} is held by {owner}")]
    ForeignTerritory {
        /// The territory.
        territory: TerritoryId,
        /// Its holder.
        owner: PlayerId,
    },

    /// A trade offer naming the proposer as its target.
    #[error("player {0} cannot trade with themselves")]
    SelfTrade(PlayerId),

    /// A trade offer with nothing on either side.
    #[error("trade offer moves no resources")]
    EmptyTrade,

    /// No open trade offer has this id.
    #[error("trade offer not found: {0}")]
    TradeNotFound(EventId),

    /// Only the target of an offer may answer it.
    #[error("trade offer {offer} is not addressed to {player}")]
    NotTradeTarget {
        /// The offer.
        offer: EventId,
        /// The player who tried to answer.
        player: PlayerId,
    },
}

impl ActionError {
    /// The category of this rejection.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(err) => ledger_kind(err),
            Self::World(err) => match err {
                WorldError::TerritoryNotFound(_) => ErrorKind::NotFound,
                WorldError::DuplicateTerritory(_)
                | WorldError::AlreadyOwned { .. }
                | WorldError::StaleBattle { .. } => ErrorKind::InvalidState,
            },
            Self::Agent(err) => match err {
                AgentError::AgentNotFound(_) => ErrorKind::NotFound,
                AgentError::NotOwner { .. } => ErrorKind::NotOwner,
                AgentError::Ledger { source } => ledger_kind(source),
                AgentError::IdsExhausted => ErrorKind::InvalidState,
            },
            Self::ForeignTerritory { .. } | Self::NotTradeTarget { .. } => ErrorKind::NotOwner,
            Self::TradeNotFound(_) => ErrorKind::NotFound,
            Self::NeutralTarget(_)
            | Self::OwnTerritory { .. }
            | Self::SelfTrade(_)
            | Self::EmptyTrade => ErrorKind::InvalidState,
        }
    }
}

const fn ledger_kind(err: &LedgerError) -> ErrorKind {
    match err {
        LedgerError::UnknownPlayer(_) => ErrorKind::NotFound,
        LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientResources,
        LedgerError::DuplicatePlayer(_) | LedgerError::Overflow(_) => ErrorKind::InvalidState,
    }
}
