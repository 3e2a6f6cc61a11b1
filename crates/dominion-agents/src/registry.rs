//! The agent registry: authoritative list of deployed agents.
//!
//! The registry owns every live [`Agent`] keyed by id. It performs the
//! synchronous half of each lifecycle step; the session schedules the
//! delayed half (activation after deploy, removal after recall).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, info};

use dominion_ledger::PlayerLedger;
use dominion_types::{Agent, AgentId, AgentStatus, AgentType, PlayerId, TerritoryId};

use crate::combat::agent_power;
use crate::costs::deployment_cost;
use crate::error::AgentError;

/// Lower bound of the deployment power roll, in thousandths.
const POWER_ROLL_MIN: i64 = 800;

/// Upper bound of the deployment power roll, in thousandths.
const POWER_ROLL_MAX: i64 = 1_200;

/// Draw the deployment power multiplier, uniform over `[0.800, 1.200]` in
/// steps of 0.001.
fn roll_power_multiplier(rng: &mut impl Rng) -> Decimal {
    Decimal::new(rng.random_range(POWER_ROLL_MIN..=POWER_ROLL_MAX), 3)
}

/// A request to put a new agent on the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployOrder {
    /// Player paying for and owning the agent.
    pub owner: PlayerId,
    /// Kind of agent.
    pub agent_type: AgentType,
    /// Territory the agent is sent to.
    pub location: TerritoryId,
    /// Free-text task.
    pub task: String,
}

/// What a recall request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecallOutcome {
    /// The agent is now recalling; the caller should schedule removal.
    Started,
    /// The agent was already recalling; nothing changed.
    AlreadyRecalling,
}

/// Registry of all live agents in a session.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: BTreeMap<AgentId, Agent>,
    next_id: u32,
}

impl AgentRegistry {
    /// Create an empty registry. Ids start at 1.
    pub const fn new() -> Self {
        Self {
            agents: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Look up an agent.
    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    /// All live agents in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.values()
    }

    /// Agents belonging to `owner`.
    pub fn owned_by<'a>(&'a self, owner: &'a PlayerId) -> impl Iterator<Item = &'a Agent> {
        self.agents.values().filter(move |a| &a.owner_id == owner)
    }

    /// Number of live agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Deploy a new agent.
    ///
    /// Charges the owner the type's price, then registers the agent as
    /// [`AgentStatus::Deploying`] with a rolled power of
    /// `base * task bonus * U[0.8, 1.2]`, the multiplier drawn in steps of
    /// 0.001 and the result rounded to cents. Nothing changes if the charge
    /// fails.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Ledger`] if the owner is unknown or cannot
    /// afford the agent, and [`AgentError::IdsExhausted`] if no id is left.
    pub fn deploy(
        &mut self,
        ledger: &mut PlayerLedger,
        order: DeployOrder,
        rng: &mut impl Rng,
        now: DateTime<Utc>,
    ) -> Result<&Agent, AgentError> {
        let id = AgentId(self.next_id);
        let next_id = self.next_id.checked_add(1).ok_or(AgentError::IdsExhausted)?;

        let cost = deployment_cost(order.agent_type);
        let reason = format!("deploy {} to territory {}", order.agent_type.label(), order.location);
        ledger.charge(&order.owner, &cost, &reason, now)?;
        self.next_id = next_id;

        let mut agent = Agent {
            id,
            name: format!("{}-{id}", order.agent_type.label()),
            agent_type: order.agent_type,
            status: AgentStatus::Deploying,
            location: order.location,
            task: order.task,
            owner_id: order.owner,
            power: Decimal::ZERO,
            cooldown_until: None,
        };
        let roll = roll_power_multiplier(rng);
        agent.power = agent_power(&agent).saturating_mul(roll).round_dp(2);

        info!(
            agent_id = %id,
            owner = %agent.owner_id,
            agent_type = agent.agent_type.label(),
            territory = %agent.location,
            power = %agent.power,
            "agent deploying"
        );

        Ok(self.agents.entry(id).or_insert(agent))
    }

    /// Finish a deployment.
    ///
    /// Returns `Ok(None)` when the agent is no longer deploying (it was
    /// recalled in transit).
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] if the agent is gone.
    pub fn activate(&mut self, id: AgentId) -> Result<Option<&Agent>, AgentError> {
        let agent = self.agents.get_mut(&id).ok_or(AgentError::AgentNotFound(id))?;
        if agent.status != AgentStatus::Deploying {
            debug!(agent_id = %id, status = ?agent.status, "activation skipped");
            return Ok(None);
        }
        agent.status = AgentStatus::Active;
        debug!(agent_id = %id, "agent active");
        Ok(Some(agent))
    }

    /// Start recalling an agent on behalf of `player`.
    ///
    /// Recalling an agent that is already recalling changes nothing and
    /// does not restart its delay.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an unknown id and
    /// [`AgentError::NotOwner`] when `player` does not own the agent.
    pub fn recall(&mut self, id: AgentId, player: &PlayerId) -> Result<RecallOutcome, AgentError> {
        let agent = self.agents.get_mut(&id).ok_or(AgentError::AgentNotFound(id))?;
        if &agent.owner_id != player {
            return Err(AgentError::NotOwner {
                agent: id,
                player: player.clone(),
            });
        }
        if agent.status == AgentStatus::Recalling {
            return Ok(RecallOutcome::AlreadyRecalling);
        }
        agent.status = AgentStatus::Recalling;
        info!(agent_id = %id, owner = %player, "agent recalling");
        Ok(RecallOutcome::Started)
    }

    /// Remove a recalled agent, returning its final record with status
    /// [`AgentStatus::Removed`].
    pub fn complete_recall(&mut self, id: AgentId) -> Option<Agent> {
        let mut agent = self.agents.remove(&id)?;
        agent.status = AgentStatus::Removed;
        debug!(agent_id = %id, "agent removed");
        Some(agent)
    }

    /// Agents able to fight for `owner` at `territory` right now.
    ///
    /// Filters by owner, location, [`AgentStatus::Active`], and an unset or
    /// elapsed cooldown.
    pub fn list_eligible(
        &self,
        owner: &PlayerId,
        territory: TerritoryId,
        now: DateTime<Utc>,
    ) -> Vec<&Agent> {
        self.agents
            .values()
            .filter(|a| {
                &a.owner_id == owner
                    && a.location == territory
                    && a.status == AgentStatus::Active
                    && !a.on_cooldown(now)
            })
            .collect()
    }

    /// Put the given agents on cooldown until `until`. Unknown ids are
    /// skipped.
    pub fn apply_cooldown(&mut self, ids: &[AgentId], until: DateTime<Utc>) {
        for id in ids {
            if let Some(agent) = self.agents.get_mut(id) {
                agent.cooldown_until = Some(until);
            }
        }
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use dominion_ledger::LedgerError;
    use dominion_types::{Player, Resources};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::tasks::DEFEND_TERRITORY;

    fn ledger_with(credits: u64) -> PlayerLedger {
        PlayerLedger::new(vec![Player {
            id: PlayerId::new("p1"),
            name: String::from("P1"),
            faction: String::from("Neon Syndicate"),
            resources: Resources::new(credits, 50, 50, 10),
        }])
        .unwrap()
    }

    fn order(agent_type: AgentType, task: &str) -> DeployOrder {
        DeployOrder {
            owner: PlayerId::new("p1"),
            agent_type,
            location: TerritoryId(3),
            task: task.to_owned(),
        }
    }

    #[test]
    fn deploy_charges_and_registers() {
        let mut ledger = ledger_with(500);
        let mut registry = AgentRegistry::new();
        let mut rng = StdRng::seed_from_u64(42);

        let agent = registry
            .deploy(&mut ledger, order(AgentType::Defense, DEFEND_TERRITORY), &mut rng, Utc::now())
            .unwrap()
            .clone();

        assert_eq!(agent.id, AgentId(1));
        assert_eq!(agent.name, "Defense-1");
        assert_eq!(agent.status, AgentStatus::Deploying);
        // 10 * 1.5 * [0.8, 1.2]
        assert!(agent.power >= dec!(12) && agent.power <= dec!(18));

        let balance = ledger.balance(&PlayerId::new("p1")).unwrap();
        assert_eq!(balance.credits, 400);
        assert_eq!(balance.synthetic_alloys, 35);
    }

    #[test]
    fn power_roll_resolves_to_thousandths() {
        let mut rng = StdRng::seed_from_u64(7);
        let rolls: Vec<Decimal> = (0..500).map(|_| roll_power_multiplier(&mut rng)).collect();

        assert!(rolls.iter().all(|r| *r >= dec!(0.8) && *r <= dec!(1.2)));
        assert!(rolls.iter().all(|r| r.scale() == 3));
        let distinct: std::collections::BTreeSet<_> = rolls.iter().collect();
        // Whole percents alone would give at most 41 values.
        assert!(distinct.len() > 41);
        assert!(rolls.iter().any(|r| r.round_dp(2) != *r));
    }

    #[test]
    fn ids_are_sequential() {
        let mut ledger = ledger_with(1_000);
        let mut registry = AgentRegistry::new();
        let mut rng = StdRng::seed_from_u64(1);
        let now = Utc::now();

        let first = registry.deploy(&mut ledger, order(AgentType::Scout, "x"), &mut rng, now).unwrap().id;
        let second = registry.deploy(&mut ledger, order(AgentType::Scout, "x"), &mut rng, now).unwrap().id;
        assert_eq!((first, second), (AgentId(1), AgentId(2)));
    }

    #[test]
    fn unaffordable_deploy_changes_nothing() {
        let mut ledger = ledger_with(50);
        let mut registry = AgentRegistry::new();
        let mut rng = StdRng::seed_from_u64(7);

        let err = registry
            .deploy(&mut ledger, order(AgentType::Defense, "Patrol"), &mut rng, Utc::now())
            .unwrap_err();

        assert!(matches!(
            err,
            AgentError::Ledger {
                source: LedgerError::InsufficientFunds { .. }
            }
        ));
        assert!(registry.is_empty());
        assert_eq!(ledger.balance(&PlayerId::new("p1")).unwrap().credits, 50);
        // The failed attempt does not burn an id.
        let next = registry.deploy(&mut ledger, order(AgentType::Scout, "x"), &mut rng, Utc::now());
        assert_eq!(next.unwrap().id, AgentId(1));
    }

    #[test]
    fn activation_only_from_deploying() {
        let mut ledger = ledger_with(500);
        let mut registry = AgentRegistry::new();
        let mut rng = StdRng::seed_from_u64(3);
        let id = registry
            .deploy(&mut ledger, order(AgentType::Scout, "x"), &mut rng, Utc::now())
            .unwrap()
            .id;

        assert_eq!(registry.activate(id).unwrap().unwrap().status, AgentStatus::Active);
        assert!(registry.activate(id).unwrap().is_none());
        assert_eq!(registry.activate(AgentId(99)), Err(AgentError::AgentNotFound(AgentId(99))));
    }

    #[test]
    fn recall_is_idempotent() {
        let mut ledger = ledger_with(500);
        let mut registry = AgentRegistry::new();
        let mut rng = StdRng::seed_from_u64(3);
        let owner = PlayerId::new("p1");
        let id = registry
            .deploy(&mut ledger, order(AgentType::Scout, "x"), &mut rng, Utc::now())
            .unwrap()
            .id;

        assert_eq!(registry.recall(id, &owner).unwrap(), RecallOutcome::Started);
        assert_eq!(registry.recall(id, &owner).unwrap(), RecallOutcome::AlreadyRecalling);

        let removed = registry.complete_recall(id).unwrap();
        assert_eq!(removed.status, AgentStatus::Removed);
        assert!(registry.get(id).is_none());
        assert_eq!(registry.recall(id, &owner), Err(AgentError::AgentNotFound(id)));
    }

    #[test]
    fn recall_by_stranger_rejected() {
        let mut ledger = ledger_with(500);
        let mut registry = AgentRegistry::new();
        let mut rng = StdRng::seed_from_u64(3);
        let id = registry
            .deploy(&mut ledger, order(AgentType::Scout, "x"), &mut rng, Utc::now())
            .unwrap()
            .id;

        let err = registry.recall(id, &PlayerId::new("intruder")).unwrap_err();
        assert!(matches!(err, AgentError::NotOwner { .. }));
        assert_eq!(registry.get(id).unwrap().status, AgentStatus::Deploying);
    }

    #[test]
    fn cooldown_excludes_until_elapsed() {
        let mut ledger = ledger_with(500);
        let mut registry = AgentRegistry::new();
        let mut rng = StdRng::seed_from_u64(9);
        let owner = PlayerId::new("p1");
        let now = Utc::now();
        let id = registry
            .deploy(&mut ledger, order(AgentType::Defense, "Patrol"), &mut rng, now)
            .unwrap()
            .id;
        registry.activate(id).unwrap();
        assert_eq!(registry.list_eligible(&owner, TerritoryId(3), now).len(), 1);

        let until = now + Duration::minutes(10);
        registry.apply_cooldown(&[id], until);
        assert!(registry.list_eligible(&owner, TerritoryId(3), now).is_empty());
        assert_eq!(registry.list_eligible(&owner, TerritoryId(3), until).len(), 1);
    }

    #[test]
    fn eligibility_filters_location_and_status() {
        let mut ledger = ledger_with(1_000);
        let mut registry = AgentRegistry::new();
        let mut rng = StdRng::seed_from_u64(11);
        let owner = PlayerId::new("p1");
        let now = Utc::now();

        let deploying = registry.deploy(&mut ledger, order(AgentType::Scout, "x"), &mut rng, now).unwrap().id;
        let mut elsewhere = order(AgentType::Scout, "x");
        elsewhere.location = TerritoryId(4);
        let away = registry.deploy(&mut ledger, elsewhere, &mut rng, now).unwrap().id;
        registry.activate(away).unwrap();

        assert!(registry.get(deploying).is_some());
        assert!(registry.list_eligible(&owner, TerritoryId(3), now).is_empty());
        assert_eq!(registry.list_eligible(&owner, TerritoryId(4), now).len(), 1);
        assert!(registry.list_eligible(&PlayerId::new("p2"), TerritoryId(4), now).is_empty());
    }
}
