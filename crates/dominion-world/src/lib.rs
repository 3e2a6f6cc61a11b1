//! Territory map and ownership state for the Dominion simulation.
//!
//! This crate owns the authoritative territory records: who holds each
//! territory, whether it is under contest, and how far an attacker has
//! pushed its control points.
//!
//! # Modules
//!
//! - [`error`] -- Error types for territory operations.
//! - [`territory_ledger`] -- The [`TerritoryLedger`]: claims and battle
//!   application.
//! - [`starting_map`] -- Default 12-territory map across three districts.

pub mod error;
pub mod starting_map;
pub mod territory_ledger;

pub use error::WorldError;
pub use starting_map::create_starting_map;
pub use territory_ledger::TerritoryLedger;
