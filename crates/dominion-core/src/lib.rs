//! Game session orchestration for the Dominion simulation.
//!
//! This crate ties the ledgers, the agent registry, the combat resolver,
//! and the event bus together into a [`GameSession`]: one independent
//! game instance whose commands are synchronous and all-or-nothing, and
//! whose delayed follow-ups (deployment, recall, rival contest, world tick,
//! trade expiry) sit in a single deadline-ordered queue.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `dominion-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- [`ActionError`] and its coarse [`ErrorKind`].
//! - [`runner`] -- Async loop advancing a shared session against wall time.
//! - [`scheduler`] -- The [`TimerQueue`] of delayed effects.
//! - [`session`] -- [`GameSession`]: commands, clock, accessors.
//! - [`tick`] -- Synthetic rival actions.
//! - [`trade`] -- Player-to-player trade offers.
//!
//! [`TimerQueue`]: scheduler::TimerQueue

pub mod config;
pub mod error;
pub mod runner;
pub mod scheduler;
pub mod session;
pub mod tick;
pub mod trade;

pub use config::{ConfigError, GameConfig};
pub use error::{ActionError, ErrorKind};
pub use runner::{NoOpCallback, PollCallback, RunSummary, SessionEndReason, run_session};
pub use session::{GameSession, SessionSetup};
pub use trade::TradeOffer;
