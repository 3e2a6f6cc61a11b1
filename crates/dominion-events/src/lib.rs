//! Publish/subscribe for the Dominion simulation.
//!
//! The session publishes a [`Notification`] after every state change;
//! outside layers (UI bridges, persistence mirrors, loggers) subscribe per
//! [`Topic`]. Delivery is synchronous: [`EventBus::publish`] returns only
//! after every handler for the topic has run, in registration order.
//!
//! # Modules
//!
//! - [`bus`] -- The [`EventBus`] registry and delivery loop.
//! - [`topic`] -- [`Topic`] names and [`Notification`] payloads.

pub mod bus;
pub mod topic;

pub use bus::{Delivery, EventBus, HandlerError, SubscriptionId};
pub use topic::{Notification, Topic, UnknownTopic};
