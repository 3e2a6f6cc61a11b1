//! Agents and combat for the Dominion simulation.
//!
//! This crate contains the logic layer for agents -- everything that
//! operates on agent state without touching I/O or timers. Scheduling the
//! delayed halves of deploy and recall is left to the session in
//! `dominion-core`.
//!
//! # Modules
//!
//! - [`combat`] -- Pure battle resolution ([`resolve_battle`]).
//! - [`costs`] -- Deployment price table.
//! - [`error`] -- Error types for agent operations ([`AgentError`]).
//! - [`registry`] -- The [`AgentRegistry`]: deploy, recall, eligibility.
//! - [`tasks`] -- Task names that carry combat modifiers, and task pools.

pub mod combat;
pub mod costs;
pub mod error;
pub mod registry;
pub mod tasks;

pub use combat::{BattleContext, ForceStrength, force_strength, resolve_battle};
pub use costs::deployment_cost;
pub use error::AgentError;
pub use registry::{AgentRegistry, DeployOrder, RecallOutcome};
