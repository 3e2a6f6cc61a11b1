//! The game session: one independent simulation instance.
//!
//! [`GameSession`] owns every ledger, the agent registry, the event bus,
//! the event log, and the timer queue. All commands take `&mut self`, so
//! every mutation and every notification happens on one timeline. The
//! session clock only moves through [`GameSession::advance_to`], which
//! fires due effects in deadline order.

use std::collections::{BTreeMap, VecDeque};

use chrono::{DateTime, TimeDelta, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use tracing::{debug, info};

use dominion_agents::{
    AgentError, AgentRegistry, BattleContext, DeployOrder, RecallOutcome, deployment_cost,
    resolve_battle,
};
use dominion_events::{EventBus, HandlerError, Notification, SubscriptionId, Topic};
use dominion_ledger::{LedgerError, PlayerLedger};
use dominion_types::{
    Agent, AgentId, AgentType, BattleId, BattleOutcome, BattleResult, EventId, EventType,
    GameEvent, Owner, Player, PlayerId, Resources, Territory, TerritoryId, TerritoryStatus,
};
use dominion_world::{TerritoryLedger, starting_map::starting_territories};

use crate::config::{GameConfig, millis};
use crate::error::ActionError;
use crate::scheduler::{Effect, TimerQueue};
use crate::trade::TradeOffer;

/// Topics refreshed after a wallet change.
const BALANCE_TOPICS: [Topic; 2] = [Topic::PlayersUpdated, Topic::PlayerUpdated];

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

/// Static inputs injected at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSetup {
    /// Map territories.
    pub territories: Vec<Territory>,
    /// Every player, including the current player and the rivals.
    pub players: Vec<Player>,
    /// The player the outside caller acts as.
    pub current_player: PlayerId,
    /// Synthetic opponents driven by the session.
    pub rivals: Vec<PlayerId>,
}

impl SessionSetup {
    /// The default map plus the roster from `config`.
    pub fn from_config(config: &GameConfig) -> Self {
        let mut players = vec![config.world.current_player.to_player()];
        players.extend(config.rivals.players.iter().map(crate::config::PlayerSpec::to_player));
        Self {
            territories: starting_territories(),
            players,
            current_player: PlayerId::new(config.world.current_player.id.clone()),
            rivals: config
                .rivals
                .players
                .iter()
                .map(|p| PlayerId::new(p.id.clone()))
                .collect(),
        }
    }
}

/// Tunables resolved from [`GameConfig`] into runtime units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Rules {
    pub(crate) deployment_delay: TimeDelta,
    pub(crate) recall_delay: TimeDelta,
    pub(crate) rival_contest_delay: TimeDelta,
    pub(crate) tick_interval: Option<TimeDelta>,
    pub(crate) trade_expiry: TimeDelta,
    pub(crate) winner_cooldown: TimeDelta,
    pub(crate) loser_cooldown: TimeDelta,
    pub(crate) claim_cost: Resources,
    pub(crate) extraction_yield: Resources,
    pub(crate) log_capacity: usize,
}

impl Rules {
    fn from_config(config: &GameConfig) -> Self {
        let tick_enabled = config.rivals.enabled && config.timers.tick_interval_ms > 0;
        Self {
            deployment_delay: millis(config.timers.deployment_ms),
            recall_delay: millis(config.timers.recall_ms),
            rival_contest_delay: millis(config.timers.rival_contest_ms),
            tick_interval: tick_enabled.then(|| millis(config.timers.tick_interval_ms)),
            trade_expiry: millis(config.timers.trade_expiry_ms),
            winner_cooldown: millis(config.combat.winner_cooldown_ms),
            loser_cooldown: millis(config.combat.loser_cooldown_ms),
            claim_cost: Resources::credits(config.economy.claim_cost),
            extraction_yield: config.economy.extraction_yield,
            log_capacity: config.world.event_log_capacity.max(1),
        }
    }
}

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// One game instance. Sessions share nothing with each other.
#[derive(Debug)]
pub struct GameSession {
    pub(crate) rules: Rules,
    pub(crate) players: PlayerLedger,
    pub(crate) world: TerritoryLedger,
    pub(crate) agents: AgentRegistry,
    pub(crate) bus: EventBus,
    pub(crate) timers: TimerQueue,
    pub(crate) events: VecDeque<GameEvent>,
    pub(crate) battles: VecDeque<BattleResult>,
    pub(crate) trades: BTreeMap<EventId, TradeOffer>,
    pub(crate) current_player: PlayerId,
    pub(crate) rivals: Vec<PlayerId>,
    pub(crate) rng: StdRng,
    pub(crate) now: DateTime<Utc>,
}

impl GameSession {
    /// Build a session starting at `start`.
    ///
    /// When rivals are enabled, the first world tick is scheduled one tick
    /// interval after `start`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::World`] for duplicate territory ids and
    /// [`ActionError::Ledger`] for duplicate players or a current player or
    /// rival missing from the roster.
    pub fn new(
        setup: SessionSetup,
        config: &GameConfig,
        start: DateTime<Utc>,
    ) -> Result<Self, ActionError> {
        let world = TerritoryLedger::new(setup.territories)?;
        let players = PlayerLedger::new(setup.players)?;
        for id in std::iter::once(&setup.current_player).chain(&setup.rivals) {
            if !players.contains(id) {
                return Err(LedgerError::UnknownPlayer(id.clone()).into());
            }
        }

        let mut session = Self {
            rules: Rules::from_config(config),
            players,
            world,
            agents: AgentRegistry::new(),
            bus: EventBus::new(),
            timers: TimerQueue::new(),
            events: VecDeque::new(),
            battles: VecDeque::new(),
            trades: BTreeMap::new(),
            current_player: setup.current_player,
            rivals: setup.rivals,
            rng: StdRng::seed_from_u64(config.world.seed),
            now: start,
        };
        if let Some(interval) = session.rules.tick_interval {
            let first = session.after(interval);
            session.timers.schedule(first, Effect::WorldTick);
        }

        info!(
            territories = session.world.len(),
            players = session.players.len(),
            rivals = session.rivals.len(),
            seed = config.world.seed,
            "session created"
        );
        Ok(session)
    }

    /// Build a session on the default map with the roster from `config`.
    ///
    /// # Errors
    ///
    /// See [`GameSession::new`].
    pub fn from_config(config: &GameConfig, start: DateTime<Utc>) -> Result<Self, ActionError> {
        Self::new(SessionSetup::from_config(config), config, start)
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    /// Claim a neutral territory for `player`.
    ///
    /// Charges the claim cost, makes the territory secure under `player`,
    /// logs a `territory_claim` event, and schedules the rival contest
    /// check.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown territory or player, `InvalidState` if the
    /// territory is owned, `InsufficientResources` if the player cannot pay.
    pub fn claim_territory(
        &mut self,
        territory: TerritoryId,
        player: &PlayerId,
    ) -> Result<Territory, ActionError> {
        let cost = self.rules.claim_cost;
        let name = self.world.ensure_claimable(territory)?.name.clone();
        self.players
            .charge(player, &cost, &format!("claim {name}"), self.now)?;
        let claimed = self.world.claim(territory, player, self.now)?.clone();

        let message = format!("{} claimed {name}", self.player_name(player));
        self.log_event(
            GameEvent::completed(EventType::TerritoryClaim, player.clone(), message, self.now)
                .with_territory(territory)
                .with_resources(&cost),
        );
        let due = self.after(self.rules.rival_contest_delay);
        self.timers.schedule(
            due,
            Effect::RivalContest {
                territory,
                claimant: player.clone(),
            },
        );

        self.notify(&[Topic::TerritoriesUpdated]);
        self.notify(&BALANCE_TOPICS);
        self.notify(&[Topic::EventsUpdated]);
        Ok(claimed)
    }

    /// Attack a territory held by another player.
    ///
    /// Resolves the battle between the attacker's and the holder's eligible
    /// agents at the territory, applies it, and puts every participant on
    /// cooldown: the winning side (both sides on a draw) for the short
    /// cooldown, the losing side for the long one.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown territory or player, `InvalidState` for a
    /// neutral territory or one the attacker already holds.
    pub fn attack_territory(
        &mut self,
        territory: TerritoryId,
        attacker: &PlayerId,
    ) -> Result<BattleResult, ActionError> {
        let attacker_record = self
            .players
            .get(attacker)
            .ok_or_else(|| LedgerError::UnknownPlayer(attacker.clone()))?;
        let target = self.world.require(territory)?;
        let defender = match &target.owner {
            Owner::Neutral => return Err(ActionError::NeutralTarget(territory)),
            Owner::Player(holder) if holder == attacker => {
                return Err(ActionError::OwnTerritory {
                    territory,
                    player: attacker.clone(),
                });
            }
            Owner::Player(holder) => holder,
        };
        let defender_record = self
            .players
            .get(defender)
            .ok_or_else(|| LedgerError::UnknownPlayer(defender.clone()))?;

        let ctx = BattleContext {
            territory: target,
            attacker: attacker_record,
            defender: defender_record,
            attacker_agents: self.agents.list_eligible(attacker, territory, self.now),
            defender_agents: self.agents.list_eligible(defender, territory, self.now),
            now: self.now,
        };
        let result = resolve_battle(&ctx, BattleId::new());
        let territory_name = target.name.clone();
        let attacker_name = attacker_record.name.clone();
        let defender_name = defender_record.name.clone();

        let updated = self.world.apply_battle_result(&result)?;
        let captured = updated.owner.is_held_by(attacker);
        let control_points = updated.control_points;

        let short = self.after(self.rules.winner_cooldown);
        let long = self.after(self.rules.loser_cooldown);
        match result.outcome {
            BattleOutcome::AttackerWon => {
                self.agents.apply_cooldown(&result.attacker_agent_ids, short);
                self.agents.apply_cooldown(&result.defender_agent_ids, long);
            }
            BattleOutcome::DefenderWon => {
                self.agents.apply_cooldown(&result.defender_agent_ids, short);
                self.agents.apply_cooldown(&result.attacker_agent_ids, long);
            }
            BattleOutcome::Draw => {
                self.agents.apply_cooldown(&result.attacker_agent_ids, short);
                self.agents.apply_cooldown(&result.defender_agent_ids, short);
            }
        }

        self.log_event(
            GameEvent::completed(
                EventType::TerritoryAttack,
                attacker.clone(),
                format!("{attacker_name} attacked {territory_name}, held by {defender_name}"),
                self.now,
            )
            .with_target(result.defender_id.clone())
            .with_territory(territory),
        );
        let verdict = match result.outcome {
            BattleOutcome::AttackerWon if captured => {
                format!("{attacker_name} captured {territory_name} from {defender_name}")
            }
            BattleOutcome::AttackerWon => format!(
                "{attacker_name} won the battle for {territory_name} ({control_points} control)"
            ),
            BattleOutcome::DefenderWon => {
                format!("{defender_name} repelled {attacker_name} at {territory_name}")
            }
            BattleOutcome::Draw => format!("The battle for {territory_name} ended in a draw"),
        };
        let mut battle_event =
            GameEvent::completed(EventType::BattleResult, attacker.clone(), verdict, self.now)
                .with_target(result.defender_id.clone())
                .with_territory(territory);
        battle_event.battle_id = Some(result.id);
        self.log_event(battle_event);

        self.battles.push_back(result.clone());
        while self.battles.len() > self.rules.log_capacity {
            self.battles.pop_front();
        }

        info!(
            territory = %territory,
            attacker = %attacker,
            defender = %result.defender_id,
            outcome = ?result.outcome,
            change = result.territory_control_change,
            captured,
            "battle resolved"
        );

        self.notify(&[Topic::TerritoriesUpdated, Topic::AgentsUpdated]);
        self.bus.publish(&Notification::BattleResult(result.clone()));
        self.notify(&[Topic::EventsUpdated]);
        Ok(result)
    }

    /// Deploy a new agent to a territory.
    ///
    /// The agent starts deploying and becomes active after the deployment
    /// delay.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown territory or player,
    /// `InsufficientResources` if the player cannot pay.
    pub fn deploy_agent(
        &mut self,
        player: &PlayerId,
        agent_type: AgentType,
        territory: TerritoryId,
        task: impl Into<String>,
    ) -> Result<Agent, ActionError> {
        let territory_name = self.world.require(territory)?.name.clone();
        let order = DeployOrder {
            owner: player.clone(),
            agent_type,
            location: territory,
            task: task.into(),
        };
        let agent = self
            .agents
            .deploy(&mut self.players, order, &mut self.rng, self.now)?
            .clone();

        let due = self.after(self.rules.deployment_delay);
        self.timers.schedule(due, Effect::CompleteDeployment(agent.id));

        let message = format!(
            "{} deployed {} to {territory_name} ({})",
            self.player_name(player),
            agent.name,
            agent.task
        );
        self.log_event(
            GameEvent::completed(EventType::AgentDeploy, player.clone(), message, self.now)
                .with_agent(agent.id)
                .with_territory(territory)
                .with_resources(&deployment_cost(agent_type)),
        );

        self.notify(&[Topic::AgentsUpdated]);
        self.notify(&BALANCE_TOPICS);
        self.notify(&[Topic::EventsUpdated]);
        Ok(agent)
    }

    /// Recall one of `player`'s agents.
    ///
    /// The agent is removed after the recall delay. Recalling an agent that
    /// is already recalling returns it unchanged and does not restart the
    /// delay.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown agent, `NotOwner` if `player` does not own
    /// it.
    pub fn recall_agent(&mut self, player: &PlayerId, agent: AgentId) -> Result<Agent, ActionError> {
        let outcome = self.agents.recall(agent, player)?;
        let record = self
            .agents
            .get(agent)
            .cloned()
            .ok_or(AgentError::AgentNotFound(agent))?;
        if outcome == RecallOutcome::AlreadyRecalling {
            debug!(agent_id = %agent, "recall ignored; already recalling");
            return Ok(record);
        }

        let due = self.after(self.rules.recall_delay);
        self.timers.schedule(due, Effect::CompleteRecall(agent));

        let message = format!("{} recalled {}", self.player_name(player), record.name);
        self.log_event(
            GameEvent::completed(EventType::AgentRecall, player.clone(), message, self.now)
                .with_agent(agent)
                .with_territory(record.location),
        );

        self.notify(&[Topic::AgentsUpdated, Topic::EventsUpdated]);
        Ok(record)
    }

    /// Extract resources from a territory the player holds or that is
    /// neutral.
    ///
    /// Each resource tag on the territory yields the configured amount of
    /// that resource. Returns the amount credited.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown territory or player, `NotOwner` if another
    /// player holds the territory.
    pub fn extract_resources(
        &mut self,
        player: &PlayerId,
        territory: TerritoryId,
    ) -> Result<Resources, ActionError> {
        if !self.players.contains(player) {
            return Err(LedgerError::UnknownPlayer(player.clone()).into());
        }
        let site = self.world.require(territory)?;
        if let Some(holder) = site.owner.player().filter(|holder| *holder != player) {
            return Err(ActionError::ForeignTerritory {
                territory,
                owner: holder.clone(),
            });
        }

        let per_tag = self.rules.extraction_yield;
        let haul = site.resource_tags.iter().fold(Resources::ZERO, |acc, kind| {
            acc.checked_add(&Resources::single(*kind, per_tag.get(*kind)))
                .unwrap_or(acc)
        });
        let site_name = site.name.clone();

        self.players
            .credit(player, &haul, &format!("extract at {site_name}"), self.now)?;

        let message = format!("{} extracted {haul} from {site_name}", self.player_name(player));
        self.log_event(
            GameEvent::completed(EventType::ResourceExtract, player.clone(), message, self.now)
                .with_territory(territory)
                .with_resources(&haul),
        );

        self.notify(&BALANCE_TOPICS);
        self.notify(&[Topic::EventsUpdated]);
        Ok(haul)
    }

    // -----------------------------------------------------------------------
    // Clock
    // -----------------------------------------------------------------------

    /// Move the session clock forward to `target`, firing every effect due
    /// on the way in deadline order. Returns how many effects fired.
    ///
    /// A `target` in the past fires nothing and leaves the clock alone.
    pub fn advance_to(&mut self, target: DateTime<Utc>) -> usize {
        let mut fired: usize = 0;
        while let Some((due, effect)) = self.timers.pop_due(target) {
            if due > self.now {
                self.now = due;
            }
            self.fire(effect);
            fired = fired.saturating_add(1);
        }
        if target > self.now {
            self.now = target;
        }
        fired
    }

    /// Move the session clock forward by `delta`.
    pub fn advance_by(&mut self, delta: TimeDelta) -> usize {
        let target = self.after(delta);
        self.advance_to(target)
    }

    /// Tear down: cancel every scheduled effect. Returns how many were
    /// cancelled.
    pub fn shutdown(&mut self) -> usize {
        let cancelled = self.timers.clear();
        info!(cancelled, "session shut down");
        cancelled
    }

    fn fire(&mut self, effect: Effect) {
        debug!(?effect, now = %self.now, "timer fired");
        match effect {
            Effect::CompleteDeployment(id) => self.complete_deployment(id),
            Effect::CompleteRecall(id) => self.complete_recall(id),
            Effect::RivalContest {
                territory,
                claimant,
            } => self.rival_contest(territory, &claimant),
            Effect::WorldTick => {
                self.world_tick();
                if let Some(interval) = self.rules.tick_interval {
                    let next = self.after(interval);
                    self.timers.schedule(next, Effect::WorldTick);
                }
            }
            Effect::ExpireTrade(id) => self.expire_trade(id),
        }
    }

    fn complete_deployment(&mut self, id: AgentId) {
        let agent = match self.agents.activate(id) {
            Ok(Some(agent)) => agent.clone(),
            Ok(None) => return,
            Err(err) => {
                debug!(agent_id = %id, error = %err, "deployment completion skipped");
                return;
            }
        };
        let territory_name = self
            .world
            .get(agent.location)
            .map_or_else(|| agent.location.to_string(), |t| t.name.clone());
        self.log_event(
            GameEvent::completed(
                EventType::AgentActivated,
                agent.owner_id.clone(),
                format!("{} is now active at {territory_name}", agent.name),
                self.now,
            )
            .with_agent(id)
            .with_territory(agent.location),
        );
        self.notify(&[Topic::AgentsUpdated, Topic::EventsUpdated]);
    }

    fn complete_recall(&mut self, id: AgentId) {
        let Some(agent) = self.agents.complete_recall(id) else {
            return;
        };
        self.log_event(
            GameEvent::completed(
                EventType::AgentRemoved,
                agent.owner_id.clone(),
                format!("{} has left the field", agent.name),
                self.now,
            )
            .with_agent(id)
            .with_territory(agent.location),
        );
        self.notify(&[Topic::AgentsUpdated, Topic::EventsUpdated]);
    }

    fn rival_contest(&mut self, territory: TerritoryId, claimant: &PlayerId) {
        let still_held = self.world.get(territory).is_some_and(|t| {
            t.owner.is_held_by(claimant) && t.status == TerritoryStatus::Secure
        });
        if !still_held {
            debug!(territory = %territory, claimant = %claimant, "rival contest skipped");
            return;
        }
        let candidates: Vec<PlayerId> = self
            .rivals
            .iter()
            .filter(|r| *r != claimant)
            .cloned()
            .collect();
        let Some(rival) = candidates.choose(&mut self.rng).cloned() else {
            debug!(territory = %territory, "no rival available to contest");
            return;
        };

        let territory_name = self
            .world
            .get(territory)
            .map_or_else(|| territory.to_string(), |t| t.name.clone());
        let message = format!(
            "{} contests {}'s claim on {territory_name}",
            self.player_name(&rival),
            self.player_name(claimant)
        );
        self.log_event(
            GameEvent::completed(EventType::RivalContest, rival.clone(), message, self.now)
                .with_target(claimant.clone())
                .with_territory(territory),
        );
        self.notify(&[Topic::EventsUpdated]);

        if let Err(err) = self.attack_territory(territory, &rival) {
            debug!(territory = %territory, rival = %rival, error = %err, "rival attack declined");
        }
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Subscribe to a topic on this session's bus.
    pub fn subscribe<F>(&mut self, topic: Topic, handler: F) -> SubscriptionId
    where
        F: FnMut(&Notification) -> Result<(), HandlerError> + Send + 'static,
    {
        self.bus.subscribe(topic, handler)
    }

    /// Cancel a subscription. Returns `false` if it was not active.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Read accessors
    // -----------------------------------------------------------------------

    /// The player the outside caller acts as.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(&self.current_player)
    }

    /// Id of the current player.
    pub const fn current_player_id(&self) -> &PlayerId {
        &self.current_player
    }

    /// Every player in id order.
    pub fn all_players(&self) -> Vec<&Player> {
        self.players.players().collect()
    }

    /// Territories held by `player`.
    pub fn player_territories(&self, player: &PlayerId) -> Vec<&Territory> {
        self.world.owned_by(player)
    }

    /// The game event log, oldest first.
    pub fn game_events(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Every territory in id order.
    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.world.territories()
    }

    /// One territory.
    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.world.get(id)
    }

    /// Every live agent in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.agents.agents()
    }

    /// Live agents belonging to `owner`, in id order.
    pub fn player_agents<'a>(&'a self, owner: &'a PlayerId) -> Vec<&'a Agent> {
        self.agents.owned_by(owner).collect()
    }

    /// One agent.
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id)
    }

    /// Agents able to fight for `owner` at `territory` right now.
    pub fn eligible_agents(&self, owner: &PlayerId, territory: TerritoryId) -> Vec<&Agent> {
        self.agents.list_eligible(owner, territory, self.now)
    }

    /// Resolved battles, oldest first.
    pub fn battles(&self) -> impl Iterator<Item = &BattleResult> {
        self.battles.iter()
    }

    /// The player ledger, for balance queries and reconciliation.
    pub const fn ledger(&self) -> &PlayerLedger {
        &self.players
    }

    /// Current session time.
    pub const fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Number of scheduled effects.
    pub fn scheduled_effects(&self) -> usize {
        self.timers.len()
    }

    /// Deadline of the next scheduled effect.
    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.timers.next_due()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    pub(crate) fn after(&self, delay: TimeDelta) -> DateTime<Utc> {
        self.now
            .checked_add_signed(delay)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub(crate) fn player_name(&self, id: &PlayerId) -> String {
        self.players
            .get(id)
            .map_or_else(|| id.to_string(), |p| p.name.clone())
    }

    pub(crate) fn log_event(&mut self, event: GameEvent) {
        debug!(
            event_type = event.event_type.as_str(),
            source = %event.source_player_id,
            message = %event.message,
            "game event"
        );
        self.events.push_back(event);
        while self.events.len() > self.rules.log_capacity {
            self.events.pop_front();
        }
    }

    /// Publish fresh snapshots on `topics`. Topics nobody listens to are
    /// skipped so no snapshot is built for them.
    pub(crate) fn notify(&mut self, topics: &[Topic]) {
        for &topic in topics {
            if self.bus.subscriber_count(topic) == 0 {
                continue;
            }
            let notification = match topic {
                Topic::TerritoriesUpdated => {
                    Notification::TerritoriesUpdated(self.world.territories().cloned().collect())
                }
                Topic::AgentsUpdated => {
                    Notification::AgentsUpdated(self.agents.agents().cloned().collect())
                }
                Topic::PlayersUpdated => {
                    Notification::PlayersUpdated(self.players.players().cloned().collect())
                }
                Topic::PlayerUpdated => match self.players.get(&self.current_player) {
                    Some(player) => Notification::PlayerUpdated(player.clone()),
                    None => continue,
                },
                Topic::EventsUpdated => {
                    Notification::EventsUpdated(self.events.iter().cloned().collect())
                }
                Topic::BattleResult => continue,
            };
            self.bus.publish(&notification);
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dominion_types::TerritoryType;

    use super::*;
    use crate::error::ErrorKind;

    fn quiet_config() -> GameConfig {
        let mut config = GameConfig::default();
        config.rivals.enabled = false;
        config
    }

    fn session() -> GameSession {
        GameSession::from_config(&quiet_config(), Utc::now()).unwrap()
    }

    fn me() -> PlayerId {
        PlayerId::new("player-1")
    }

    #[test]
    fn unknown_current_player_rejected() {
        let config = quiet_config();
        let mut setup = SessionSetup::from_config(&config);
        setup.current_player = PlayerId::new("ghost");
        let err = GameSession::new(setup, &config, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn world_tick_scheduled_only_when_rivals_enabled() {
        assert_eq!(session().scheduled_effects(), 0);
        let live = GameSession::from_config(&GameConfig::default(), Utc::now()).unwrap();
        assert_eq!(live.scheduled_effects(), 1);
    }

    #[test]
    fn claim_schedules_rival_contest() {
        let mut s = session();
        s.claim_territory(TerritoryId(1), &me()).unwrap();
        assert_eq!(s.scheduled_effects(), 1);
        assert_eq!(s.next_due(), Some(s.now() + TimeDelta::seconds(30)));
    }

    #[test]
    fn attack_on_neutral_or_own_territory_rejected() {
        let mut s = session();
        let err = s.attack_territory(TerritoryId(2), &me()).unwrap_err();
        assert_eq!(err, ActionError::NeutralTarget(TerritoryId(2)));

        s.claim_territory(TerritoryId(2), &me()).unwrap();
        let err = s.attack_territory(TerritoryId(2), &me()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn extraction_yields_per_tag() {
        let mut s = session();
        // Spire Plaza carries credits and data shards.
        let haul = s.extract_resources(&me(), TerritoryId(2)).unwrap();
        assert_eq!(haul, Resources::new(25, 10, 0, 0));
    }

    #[test]
    fn extraction_from_rival_territory_rejected() {
        let mut s = session();
        let rival = PlayerId::new("rival-1");
        s.claim_territory(TerritoryId(2), &rival).unwrap();
        let before = s.current_player().unwrap().resources;

        let err = s.extract_resources(&me(), TerritoryId(2)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotOwner);
        assert_eq!(s.current_player().unwrap().resources, before);
    }

    #[test]
    fn event_log_is_capped() {
        let mut config = quiet_config();
        config.world.event_log_capacity = 2;
        let mut s = GameSession::from_config(&config, Utc::now()).unwrap();
        for id in 1..=4 {
            s.extract_resources(&me(), TerritoryId(id)).unwrap();
        }
        let kept: Vec<Option<TerritoryId>> = s.game_events().map(|e| e.territory_id).collect();
        assert_eq!(kept, vec![Some(TerritoryId(3)), Some(TerritoryId(4))]);
    }

    #[test]
    fn custom_map_is_used() {
        let config = quiet_config();
        let mut setup = SessionSetup::from_config(&config);
        setup.territories = vec![Territory::neutral(
            TerritoryId(7),
            "Lone Spire",
            TerritoryType::Outpost,
            [],
        )];
        let s = GameSession::new(setup, &config, Utc::now()).unwrap();
        assert_eq!(s.territories().count(), 1);
        assert!(s.territory(TerritoryId(7)).is_some());
    }
}
