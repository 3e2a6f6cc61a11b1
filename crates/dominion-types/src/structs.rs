//! Core entity structs for the Dominion simulation.
//!
//! These are plain data records. The ledgers in the downstream crates own
//! the authoritative copies and enforce the invariants; the structs here
//! only carry state between the core and its callers.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{
    AgentStatus, AgentType, BattleOutcome, EventStatus, EventType, Owner, ResourceKind,
    TerritoryStatus, TerritoryType,
};
use crate::ids::{AgentId, BattleId, EventId, PlayerId, TerritoryId};

/// Upper bound of a territory's control points.
pub const MAX_CONTROL_POINTS: u8 = 100;

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

/// A bundle of the four wallet resources.
///
/// Used both as a player's balance and as a price tag. All quantities are
/// unsigned, so a balance can never be represented as negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export, export_to = "bindings/")]
pub struct Resources {
    /// General-purpose currency.
    pub credits: u64,
    /// Data shards.
    pub data_shards: u64,
    /// Synthetic alloys.
    pub synthetic_alloys: u64,
    /// Quantum cores.
    pub quantum_cores: u64,
}

impl Resources {
    /// An empty bundle.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Build a bundle from the four quantities in wallet order.
    pub const fn new(
        credits: u64,
        data_shards: u64,
        synthetic_alloys: u64,
        quantum_cores: u64,
    ) -> Self {
        Self {
            credits,
            data_shards,
            synthetic_alloys,
            quantum_cores,
        }
    }

    /// A bundle holding only credits.
    pub const fn credits(amount: u64) -> Self {
        Self::new(amount, 0, 0, 0)
    }

    /// A bundle holding `amount` of a single resource.
    pub const fn single(kind: ResourceKind, amount: u64) -> Self {
        match kind {
            ResourceKind::Credits => Self::new(amount, 0, 0, 0),
            ResourceKind::DataShards => Self::new(0, amount, 0, 0),
            ResourceKind::SyntheticAlloys => Self::new(0, 0, amount, 0),
            ResourceKind::QuantumCores => Self::new(0, 0, 0, amount),
        }
    }

    /// Quantity of one resource.
    pub const fn get(&self, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Credits => self.credits,
            ResourceKind::DataShards => self.data_shards,
            ResourceKind::SyntheticAlloys => self.synthetic_alloys,
            ResourceKind::QuantumCores => self.quantum_cores,
        }
    }

    /// Whether every quantity is zero.
    pub const fn is_zero(&self) -> bool {
        self.credits == 0
            && self.data_shards == 0
            && self.synthetic_alloys == 0
            && self.quantum_cores == 0
    }

    /// Whether this bundle holds at least `cost` of every resource.
    pub const fn covers(&self, cost: &Self) -> bool {
        self.credits >= cost.credits
            && self.data_shards >= cost.data_shards
            && self.synthetic_alloys >= cost.synthetic_alloys
            && self.quantum_cores >= cost.quantum_cores
    }

    /// Subtract `cost` from every resource, or `None` if any would go negative.
    pub fn checked_sub(&self, cost: &Self) -> Option<Self> {
        Some(Self {
            credits: self.credits.checked_sub(cost.credits)?,
            data_shards: self.data_shards.checked_sub(cost.data_shards)?,
            synthetic_alloys: self.synthetic_alloys.checked_sub(cost.synthetic_alloys)?,
            quantum_cores: self.quantum_cores.checked_sub(cost.quantum_cores)?,
        })
    }

    /// Add `amount` to every resource, or `None` on overflow.
    pub fn checked_add(&self, amount: &Self) -> Option<Self> {
        Some(Self {
            credits: self.credits.checked_add(amount.credits)?,
            data_shards: self.data_shards.checked_add(amount.data_shards)?,
            synthetic_alloys: self.synthetic_alloys.checked_add(amount.synthetic_alloys)?,
            quantum_cores: self.quantum_cores.checked_add(amount.quantum_cores)?,
        })
    }

    /// The non-zero entries, keyed by resource kind.
    pub fn to_map(&self) -> BTreeMap<ResourceKind, u64> {
        ResourceKind::ALL
            .into_iter()
            .map(|kind| (kind, self.get(kind)))
            .filter(|&(_, quantity)| quantity > 0)
            .collect()
    }
}

impl core::fmt::Display for Resources {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let parts: Vec<String> = self
            .to_map()
            .into_iter()
            .map(|(kind, quantity)| format!("{quantity} {}", kind.as_str()))
            .collect();
        if parts.is_empty() {
            f.write_str("nothing")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

// ---------------------------------------------------------------------------
// Territory
// ---------------------------------------------------------------------------

/// A map cell with ownership and contested-control state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Territory {
    /// Static map identifier.
    pub id: TerritoryId,
    /// Display name.
    pub name: String,
    /// Terrain class.
    pub territory_type: TerritoryType,
    /// Current holder.
    pub owner: Owner,
    /// Secure or contested.
    pub status: TerritoryStatus,
    /// Attacker progress, 0..=100. Only meaningful while contested.
    pub control_points: u8,
    /// Resources this territory yields on extraction.
    pub resource_tags: BTreeSet<ResourceKind>,
    /// Last time ownership or control changed.
    pub last_capture_time: Option<DateTime<Utc>>,
}

impl Territory {
    /// Create an unclaimed, secure territory.
    pub fn neutral(
        id: TerritoryId,
        name: impl Into<String>,
        territory_type: TerritoryType,
        resource_tags: impl IntoIterator<Item = ResourceKind>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            territory_type,
            owner: Owner::Neutral,
            status: TerritoryStatus::Secure,
            control_points: 0,
            resource_tags: resource_tags.into_iter().collect(),
            last_capture_time: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// A player-owned unit stationed on a territory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Agent {
    /// Registry-assigned identifier.
    pub id: AgentId,
    /// Display name.
    pub name: String,
    /// Role.
    pub agent_type: AgentType,
    /// Lifecycle state.
    pub status: AgentStatus,
    /// Territory the agent is stationed on.
    pub location: TerritoryId,
    /// Free-text assignment, e.g. `"Defend Territory"`.
    pub task: String,
    /// Owning player.
    pub owner_id: PlayerId,
    /// Rolled strength, informational for the UI.
    #[ts(as = "String")]
    pub power: Decimal,
    /// Combat is forbidden until this time passes.
    pub cooldown_until: Option<DateTime<Utc>>,
}

impl Agent {
    /// Whether the agent's cooldown is still running at `now`.
    pub fn on_cooldown(&self, now: DateTime<Utc>) -> bool {
        self.cooldown_until.is_some_and(|until| until > now)
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// A participant with a resource wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Player {
    /// Caller-supplied identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Faction label.
    pub faction: String,
    /// Current balances.
    pub resources: Resources,
}

// ---------------------------------------------------------------------------
// GameEvent
// ---------------------------------------------------------------------------

/// An immutable record of something that happened in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameEvent {
    /// Unique event identifier.
    pub id: EventId,
    /// Category.
    pub event_type: EventType,
    /// The player who caused the event.
    pub source_player_id: PlayerId,
    /// The player on the receiving end, if any.
    pub target_player_id: Option<PlayerId>,
    /// Territory involved, if any.
    pub territory_id: Option<TerritoryId>,
    /// Agent involved, if any.
    pub agent_id: Option<AgentId>,
    /// Resources moved or requested, if any.
    pub resources: Option<BTreeMap<ResourceKind, u64>>,
    /// Human-readable description.
    pub message: String,
    /// Session time the event was recorded.
    pub timestamp: DateTime<Utc>,
    /// Status of the thread this event belongs to.
    pub status: EventStatus,
    /// When a pending event lapses.
    pub expires_at: Option<DateTime<Utc>>,
    /// The earlier event this one supersedes.
    pub thread_id: Option<EventId>,
    /// The battle this event reports, for `battle_result` events.
    pub battle_id: Option<BattleId>,
}

impl GameEvent {
    /// Start a completed event with no optional fields set.
    pub fn completed(
        event_type: EventType,
        source_player_id: PlayerId,
        message: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            source_player_id,
            target_player_id: None,
            territory_id: None,
            agent_id: None,
            resources: None,
            message: message.into(),
            timestamp,
            status: EventStatus::Completed,
            expires_at: None,
            thread_id: None,
            battle_id: None,
        }
    }

    /// Set the target player.
    #[must_use]
    pub fn with_target(mut self, target: PlayerId) -> Self {
        self.target_player_id = Some(target);
        self
    }

    /// Set the territory.
    #[must_use]
    pub const fn with_territory(mut self, territory: TerritoryId) -> Self {
        self.territory_id = Some(territory);
        self
    }

    /// Set the agent.
    #[must_use]
    pub const fn with_agent(mut self, agent: AgentId) -> Self {
        self.agent_id = Some(agent);
        self
    }

    /// Attach a resource map (omitted when empty).
    #[must_use]
    pub fn with_resources(mut self, resources: &Resources) -> Self {
        let map = resources.to_map();
        self.resources = if map.is_empty() { None } else { Some(map) };
        self
    }
}

// ---------------------------------------------------------------------------
// BattleResult
// ---------------------------------------------------------------------------

/// The immutable outcome of one resolved attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BattleResult {
    /// Unique battle identifier.
    pub id: BattleId,
    /// Where the battle took place.
    pub territory_id: TerritoryId,
    /// The attacking player.
    pub attacker_id: PlayerId,
    /// The defending player (owner at the time of the attack).
    pub defender_id: PlayerId,
    /// Agents that fought for the attacker.
    pub attacker_agent_ids: Vec<AgentId>,
    /// Agents that fought for the defender.
    pub defender_agent_ids: Vec<AgentId>,
    /// Result class.
    pub outcome: BattleOutcome,
    /// Signed change applied to the territory's control points.
    pub territory_control_change: i32,
    /// Aggregate attack power.
    #[ts(as = "String")]
    pub attacker_power: Decimal,
    /// Aggregate defense power after the territory bonus.
    #[ts(as = "String")]
    pub defender_power: Decimal,
    /// Session time of resolution.
    pub timestamp: DateTime<Utc>,
    /// Human-readable battle transcript.
    pub details: String,
}
