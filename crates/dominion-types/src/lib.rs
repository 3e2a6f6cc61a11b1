//! Shared type definitions for the Dominion territory-control simulation.
//!
//! This crate is the single source of truth for the entities exchanged
//! between the simulation core and its callers. Types flow downstream to
//! `TypeScript` via `ts-rs` for the game client.
//!
//! # Modules
//!
//! - [`ids`] -- Typed identifiers for territories, agents, players, events
//!   and battles
//! - [`enums`] -- Closed enumerations (statuses, outcomes, resource kinds)
//! - [`structs`] -- Entity records (territory, agent, player, event, battle)

pub mod enums;
pub mod ids;
pub mod structs;

pub use enums::{
    AgentStatus, AgentType, BattleOutcome, EventStatus, EventType, Owner, ResourceKind,
    TerritoryStatus, TerritoryType,
};
pub use ids::{AgentId, BattleId, EventId, PlayerId, TerritoryId};
pub use structs::{
    Agent, BattleResult, GameEvent, MAX_CONTROL_POINTS, Player, Resources, Territory,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        use ts_rs::TS;

        let _ = crate::ids::TerritoryId::export_all();
        let _ = crate::ids::AgentId::export_all();
        let _ = crate::ids::EventId::export_all();
        let _ = crate::ids::BattleId::export_all();
        let _ = crate::ids::PlayerId::export_all();

        let _ = crate::enums::ResourceKind::export_all();
        let _ = crate::enums::TerritoryType::export_all();
        let _ = crate::enums::TerritoryStatus::export_all();
        let _ = crate::enums::Owner::export_all();
        let _ = crate::enums::AgentType::export_all();
        let _ = crate::enums::AgentStatus::export_all();
        let _ = crate::enums::EventType::export_all();
        let _ = crate::enums::EventStatus::export_all();
        let _ = crate::enums::BattleOutcome::export_all();

        let _ = crate::structs::Resources::export_all();
        let _ = crate::structs::Territory::export_all();
        let _ = crate::structs::Agent::export_all();
        let _ = crate::structs::Player::export_all();
        let _ = crate::structs::GameEvent::export_all();
        let _ = crate::structs::BattleResult::export_all();
    }
}
