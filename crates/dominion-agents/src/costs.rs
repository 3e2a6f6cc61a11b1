//! Deployment prices for each agent type.
//!
//! | Type | Credits | Data shards | Alloys | Cores |
//! |------|---------|-------------|--------|-------|
//! | Scout | 50 | 10 | 0 | 0 |
//! | Defense | 100 | 0 | 15 | 0 |
//! | Trader | 150 | 0 | 0 | 5 |
//! | Resource | 75 | 5 | 10 | 0 |

use dominion_types::{AgentType, Resources};

/// Return the price of deploying one agent of the given type.
pub const fn deployment_cost(agent_type: AgentType) -> Resources {
    match agent_type {
        AgentType::Scout => Resources::new(50, 10, 0, 0),
        AgentType::Defense => Resources::new(100, 0, 15, 0),
        AgentType::Trader => Resources::new(150, 0, 0, 5),
        AgentType::Resource => Resources::new(75, 5, 10, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_type_costs_credits() {
        for agent_type in AgentType::ALL {
            assert!(deployment_cost(agent_type).credits > 0);
        }
    }

    #[test]
    fn defense_needs_alloys() {
        let cost = deployment_cost(AgentType::Defense);
        assert_eq!(cost.credits, 100);
        assert_eq!(cost.synthetic_alloys, 15);
    }
}
