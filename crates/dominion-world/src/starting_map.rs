//! Default starting map for the Dominion simulation.
//!
//! Twelve territories across three districts (Neon Core, the Foundry Belt
//! and the Outer Wastes). Everything starts neutral and secure; ids run
//! from 1 to 12 in district order.

use dominion_types::{ResourceKind, Territory, TerritoryId, TerritoryType};

use crate::error::WorldError;
use crate::territory_ledger::TerritoryLedger;

use dominion_types::ResourceKind::{Credits, DataShards, QuantumCores, SyntheticAlloys};

/// Static map rows: name, type, resource tags.
const MAP: [(&str, TerritoryType, &[ResourceKind]); 12] = [
    // --- Neon Core ---
    ("Neon Row", TerritoryType::Urban, &[Credits]),
    ("Spire Plaza", TerritoryType::Urban, &[Credits, DataShards]),
    ("Relay Nine", TerritoryType::DataHub, &[DataShards]),
    ("Archive Stacks", TerritoryType::DataHub, &[DataShards, QuantumCores]),
    // --- Foundry Belt ---
    ("Rust Yard", TerritoryType::Industrial, &[SyntheticAlloys]),
    ("Smelter Ring", TerritoryType::Industrial, &[SyntheticAlloys, Credits]),
    ("Coolant Docks", TerritoryType::Industrial, &[SyntheticAlloys]),
    ("Gridline Depot", TerritoryType::Outpost, &[Credits]),
    // --- Outer Wastes ---
    ("Ashfall Flats", TerritoryType::Wasteland, &[SyntheticAlloys]),
    ("Glass Dunes", TerritoryType::Wasteland, &[]),
    ("Crater Array", TerritoryType::Outpost, &[QuantumCores]),
    ("Static Reach", TerritoryType::Wasteland, &[DataShards]),
];

/// The starting territories as plain records.
pub fn starting_territories() -> Vec<Territory> {
    (1_u32..)
        .zip(MAP)
        .map(|(id, (name, territory_type, tags))| {
            Territory::neutral(TerritoryId(id), name, territory_type, tags.iter().copied())
        })
        .collect()
}

/// Create the default starting map.
///
/// # Errors
///
/// Returns [`WorldError`] if map construction fails (should not happen
/// with the hard-coded data).
pub fn create_starting_map() -> Result<TerritoryLedger, WorldError> {
    TerritoryLedger::new(starting_territories())
}
