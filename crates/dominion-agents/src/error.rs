//! Error types for the dominion-agents crate.
//!
//! All operations that can fail return typed errors rather than panicking.

use dominion_ledger::LedgerError;
use dominion_types::{AgentId, PlayerId};

/// Errors that can occur during agent operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AgentError {
    /// Agent with the given ID is not in the registry.
    #[error("agent not found: {0}")]
    AgentNotFound(AgentId),

    /// The acting player does not own the agent.
    #[error("agent {agent} is not owned by {player}")]
    NotOwner {
        /// The agent.
        agent: AgentId,
        /// The player who tried to act on it.
        player: PlayerId,
    },

    /// The owner's wallet rejected the deployment charge.
    #[error("deployment charge failed: {source}")]
    Ledger {
        /// The underlying ledger error.
        #[from]
        source: LedgerError,
    },

    /// The registry ran out of agent ids.
    #[error("agent id space exhausted")]
    IdsExhausted,
}
