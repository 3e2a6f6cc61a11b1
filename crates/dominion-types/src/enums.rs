//! Enumeration types for the Dominion simulation.
//!
//! Every state the UI layer used to pass around as a bare string
//! (`"attacker_won"`, `"active"`, `"contested"`) is a closed enum here.
//! Serde names are the `snake_case` wire names, except resource kinds,
//! which follow the `camelCase` wallet fields.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::PlayerId;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A resource held in a player's wallet and produced by territories.
///
/// Serialized in `camelCase`, matching the field names of
/// [`Resources`](crate::Resources).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub enum ResourceKind {
    /// General-purpose currency.
    Credits,
    /// Intelligence fragments harvested from data hubs.
    DataShards,
    /// Industrial building material.
    SyntheticAlloys,
    /// Rare high-tier resource.
    QuantumCores,
}

impl ResourceKind {
    /// All resource kinds in wallet order.
    pub const ALL: [Self; 4] = [
        Self::Credits,
        Self::DataShards,
        Self::SyntheticAlloys,
        Self::QuantumCores,
    ];

    /// The wire name used in event resource maps.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credits => "credits",
            Self::DataShards => "dataShards",
            Self::SyntheticAlloys => "syntheticAlloys",
            Self::QuantumCores => "quantumCores",
        }
    }
}

// ---------------------------------------------------------------------------
// Territories
// ---------------------------------------------------------------------------

/// The terrain class of a territory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TerritoryType {
    /// Dense city blocks.
    Urban,
    /// Factories and refineries.
    Industrial,
    /// Server farms and relay nodes.
    DataHub,
    /// Irradiated open ground.
    Wasteland,
    /// Fortified frontier station.
    Outpost,
}

/// Whether a territory is currently being fought over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TerritoryStatus {
    /// No active contest; control points are not meaningful.
    Secure,
    /// Under attack; control points track the attacker's progress.
    Contested,
}

/// The holder of a territory.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Owner {
    /// Unclaimed.
    Neutral,
    /// Held by a player.
    Player(PlayerId),
}

impl Owner {
    /// Return the owning player, or `None` for neutral ground.
    pub const fn player(&self) -> Option<&PlayerId> {
        match self {
            Self::Neutral => None,
            Self::Player(id) => Some(id),
        }
    }

    /// Whether the territory is unclaimed.
    pub const fn is_neutral(&self) -> bool {
        matches!(self, Self::Neutral)
    }

    /// Whether `player` holds this territory.
    pub fn is_held_by(&self, player: &PlayerId) -> bool {
        self.player() == Some(player)
    }
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

/// The role of a deployed agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AgentType {
    /// Fast reconnaissance and sabotage unit.
    Scout,
    /// Garrison unit.
    Defense,
    /// Commerce unit.
    Trader,
    /// Extraction unit.
    Resource,
}

impl AgentType {
    /// All agent types.
    pub const ALL: [Self; 4] = [Self::Scout, Self::Defense, Self::Trader, Self::Resource];

    /// Human-readable label, used in generated agent names.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Scout => "Scout",
            Self::Defense => "Defense",
            Self::Trader => "Trader",
            Self::Resource => "Resource",
        }
    }
}

/// Lifecycle state of an agent.
///
/// `Deploying -> Active -> Recalling -> Removed`. A deploying agent may also
/// be recalled directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum AgentStatus {
    /// In transit to its territory; cannot fight yet.
    Deploying,
    /// On station and eligible for combat (subject to cooldown).
    Active,
    /// Withdrawing; removed when the recall delay elapses.
    Recalling,
    /// Gone from the registry. Only seen in the final event for the agent.
    Removed,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The category of a [`GameEvent`](crate::GameEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventType {
    /// A neutral territory was claimed.
    TerritoryClaim,
    /// A territory was attacked.
    TerritoryAttack,
    /// A battle was resolved; links to the stored `BattleResult`.
    BattleResult,
    /// A rival faction checked a freshly claimed territory.
    RivalContest,
    /// An agent was dispatched.
    AgentDeploy,
    /// An agent finished deploying.
    AgentActivated,
    /// An agent was ordered home.
    AgentRecall,
    /// An agent finished recalling and left the registry.
    AgentRemoved,
    /// Resources were extracted from a territory.
    ResourceExtract,
    /// A resource trade was proposed.
    TradeOffer,
    /// A trade offer was accepted.
    TradeAccepted,
    /// A trade offer was rejected.
    TradeRejected,
    /// A trade offer lapsed without an answer.
    TradeExpired,
}

impl EventType {
    /// The `snake_case` wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TerritoryClaim => "territory_claim",
            Self::TerritoryAttack => "territory_attack",
            Self::BattleResult => "battle_result",
            Self::RivalContest => "rival_contest",
            Self::AgentDeploy => "agent_deploy",
            Self::AgentActivated => "agent_activated",
            Self::AgentRecall => "agent_recall",
            Self::AgentRemoved => "agent_removed",
            Self::ResourceExtract => "resource_extract",
            Self::TradeOffer => "trade_offer",
            Self::TradeAccepted => "trade_accepted",
            Self::TradeRejected => "trade_rejected",
            Self::TradeExpired => "trade_expired",
        }
    }
}

/// Status carried by a [`GameEvent`](crate::GameEvent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventStatus {
    /// Awaiting an answer (trade offers).
    Pending,
    /// Answered positively.
    Accepted,
    /// Answered negatively or lapsed.
    Rejected,
    /// A finished fact.
    Completed,
}

// ---------------------------------------------------------------------------
// Battles
// ---------------------------------------------------------------------------

/// Result class of a resolved battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BattleOutcome {
    /// The attacking roster prevailed.
    AttackerWon,
    /// The defending roster held.
    DefenderWon,
    /// Neither side prevailed.
    Draw,
}
