//! Topic names and notification payloads.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use dominion_types::{Agent, BattleResult, GameEvent, Player, Territory};

/// A channel subscribers can listen on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    /// Full territory list after any territory change.
    TerritoriesUpdated,
    /// Full agent list after any agent change.
    AgentsUpdated,
    /// Full player list after any balance change.
    PlayersUpdated,
    /// The current player's record after their balance changes.
    PlayerUpdated,
    /// The game event log after an append.
    EventsUpdated,
    /// A single resolved battle.
    BattleResult,
}

impl Topic {
    /// Every topic.
    pub const ALL: [Self; 6] = [
        Self::TerritoriesUpdated,
        Self::AgentsUpdated,
        Self::PlayersUpdated,
        Self::PlayerUpdated,
        Self::EventsUpdated,
        Self::BattleResult,
    ];

    /// Wire name of the topic.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TerritoriesUpdated => "territories_updated",
            Self::AgentsUpdated => "agents_updated",
            Self::PlayersUpdated => "players_updated",
            Self::PlayerUpdated => "player_updated",
            Self::EventsUpdated => "events_updated",
            Self::BattleResult => "battle_result",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unrecognised topic name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown topic: {0}")]
pub struct UnknownTopic(pub String);

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| UnknownTopic(s.to_owned()))
    }
}

/// A payload delivered to subscribers.
///
/// Each variant belongs to exactly one [`Topic`]. Serialised adjacently
/// tagged, e.g. `{"topic":"battle_result","payload":{...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", content = "payload", rename_all = "snake_case")]
pub enum Notification {
    /// Snapshot of every territory.
    TerritoriesUpdated(Vec<Territory>),
    /// Snapshot of every live agent.
    AgentsUpdated(Vec<Agent>),
    /// Snapshot of every player.
    PlayersUpdated(Vec<Player>),
    /// The current player.
    PlayerUpdated(Player),
    /// The full event log, oldest first.
    EventsUpdated(Vec<GameEvent>),
    /// One resolved battle.
    BattleResult(BattleResult),
}

impl Notification {
    /// The topic this payload is published on.
    pub const fn topic(&self) -> Topic {
        match self {
            Self::TerritoriesUpdated(_) => Topic::TerritoriesUpdated,
            Self::AgentsUpdated(_) => Topic::AgentsUpdated,
            Self::PlayersUpdated(_) => Topic::PlayersUpdated,
            Self::PlayerUpdated(_) => Topic::PlayerUpdated,
            Self::EventsUpdated(_) => Topic::EventsUpdated,
            Self::BattleResult(_) => Topic::BattleResult,
        }
    }

    /// Serialise to JSON for forwarding to an outside layer.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; this does not happen for the payload
    /// types in this crate.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
