//! Error types for the `dominion-world` crate.

use dominion_types::{PlayerId, TerritoryId};

/// Errors that can occur during territory operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// No territory with this id exists on the map.
    #[error("territory not found: {0}")]
    TerritoryNotFound(TerritoryId),

    /// Two territories in the map data share an id.
    #[error("duplicate territory id: {0}")]
    DuplicateTerritory(TerritoryId),

    /// A claim was attempted on a territory that already has an owner.
    #[error("territory {territory} is already held by {owner}")]
    AlreadyOwned {
        /// The territory.
        territory: TerritoryId,
        /// Its current holder.
        owner: PlayerId,
    },

    /// A battle result names a defender that no longer holds the territory.
    #[error("battle for territory {territory} names defender {defender}, which does not hold it")]
    StaleBattle {
        /// The territory.
        territory: TerritoryId,
        /// The defender named in the result.
        defender: PlayerId,
    },
}
