//! World tick: synthetic rival activity.
//!
//! Every tick interval one rival performs one action chosen uniformly from
//! claim, attack, deploy and extract against a uniformly chosen territory.
//! The action goes through the same session commands a real player uses,
//! so it can never break a ledger invariant. Rejections are expected noise:
//! they are logged at debug level and dropped.

use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

use dominion_agents::tasks::task_pool;
use dominion_types::{AgentType, PlayerId, TerritoryId};

use crate::error::ActionError;
use crate::session::GameSession;

/// The kinds of action a rival can take on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticAction {
    /// Claim the territory.
    Claim,
    /// Attack the territory.
    Attack,
    /// Deploy an agent there.
    Deploy,
    /// Extract resources there.
    Extract,
}

impl SyntheticAction {
    /// Every action, in draw order.
    pub const ALL: [Self; 4] = [Self::Claim, Self::Attack, Self::Deploy, Self::Extract];
}

/// One rival's intended move for a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickPlan {
    /// Acting rival.
    pub rival: PlayerId,
    /// What it does.
    pub action: SyntheticAction,
    /// Where.
    pub territory: TerritoryId,
    /// Agent type, used by [`SyntheticAction::Deploy`].
    pub agent_type: AgentType,
    /// Agent task, used by [`SyntheticAction::Deploy`].
    pub task: &'static str,
}

/// Draw a plan. Returns `None` when there are no rivals or no territories.
pub fn plan_tick(
    rng: &mut impl Rng,
    rivals: &[PlayerId],
    territories: &[TerritoryId],
) -> Option<TickPlan> {
    let rival = rivals.choose(rng)?.clone();
    let action = *SyntheticAction::ALL.choose(rng)?;
    let territory = *territories.choose(rng)?;
    let agent_type = *AgentType::ALL.choose(rng)?;
    let task = task_pool(agent_type).choose(rng).copied().unwrap_or_default();
    Some(TickPlan {
        rival,
        action,
        territory,
        agent_type,
        task,
    })
}

/// Outcome of one world tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    /// The move that was attempted.
    pub plan: TickPlan,
    /// The session's answer.
    pub outcome: Result<(), ActionError>,
}

impl GameSession {
    /// Run one synthetic rival action now. Returns `None` when nothing
    /// could be planned.
    pub fn world_tick(&mut self) -> Option<TickReport> {
        let territory_ids = self.world.ids();
        let plan = plan_tick(&mut self.rng, &self.rivals, &territory_ids)?;

        let outcome = match plan.action {
            SyntheticAction::Claim => self.claim_territory(plan.territory, &plan.rival).map(drop),
            SyntheticAction::Attack => self.attack_territory(plan.territory, &plan.rival).map(drop),
            SyntheticAction::Deploy => self
                .deploy_agent(&plan.rival, plan.agent_type, plan.territory, plan.task)
                .map(drop),
            SyntheticAction::Extract => {
                self.extract_resources(&plan.rival, plan.territory).map(drop)
            }
        };

        match &outcome {
            Ok(()) => debug!(rival = %plan.rival, action = ?plan.action, territory = %plan.territory, "rival acted"),
            Err(err) => debug!(
                rival = %plan.rival,
                action = ?plan.action,
                territory = %plan.territory,
                error = %err,
                "rival action declined"
            ),
        }
        Some(TickReport { plan, outcome })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn no_rivals_no_plan() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(plan_tick(&mut rng, &[], &[TerritoryId(1)]).is_none());
        assert!(plan_tick(&mut rng, &[PlayerId::new("r")], &[]).is_none());
    }

    #[test]
    fn same_seed_same_plans() {
        let rivals = [PlayerId::new("r1"), PlayerId::new("r2")];
        let map: Vec<TerritoryId> = (1..=12).map(TerritoryId).collect();
        let draw = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            (0..20)
                .map(|_| plan_tick(&mut rng, &rivals, &map).unwrap())
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(9), draw(9));
    }

    #[test]
    fn every_action_eventually_drawn() {
        let rivals = [PlayerId::new("r1")];
        let map = [TerritoryId(1)];
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = Vec::new();
        for _ in 0..200 {
            let plan = plan_tick(&mut rng, &rivals, &map).unwrap();
            if !seen.contains(&plan.action) {
                seen.push(plan.action);
            }
            assert!(task_pool(plan.agent_type).contains(&plan.task));
        }
        assert_eq!(seen.len(), SyntheticAction::ALL.len());
    }
}
