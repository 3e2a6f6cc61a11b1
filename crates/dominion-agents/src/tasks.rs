//! Agent task names.
//!
//! Tasks are free text, but two of them change combat power: a defense
//! agent on [`DEFEND_TERRITORY`] and a scout on [`SABOTAGE`].

use dominion_types::AgentType;

/// Garrison duty; boosts defense agents.
pub const DEFEND_TERRITORY: &str = "Defend Territory";

/// Disruption duty; boosts scouts.
pub const SABOTAGE: &str = "Sabotage";

/// Typical tasks for each agent type, used by synthetic players.
pub const fn task_pool(agent_type: AgentType) -> &'static [&'static str] {
    match agent_type {
        AgentType::Scout => &["Reconnaissance", SABOTAGE],
        AgentType::Defense => &[DEFEND_TERRITORY, "Patrol"],
        AgentType::Trader => &["Negotiate Deals", "Market Analysis"],
        AgentType::Resource => &["Extract Resources", "Survey"],
    }
}
