//! Battle resolution between two agent rosters.
//!
//! ## Resolution flow
//!
//! 1. Drop agents whose cooldown has not expired.
//! 2. Sum `base_power(type) * task_multiplier(type, task)` per roster.
//! 3. Scale rosters larger than three by `1 - (size - 3) * 0.1`, then clamp
//!    the total to at least 1.
//! 4. Give the defender a flat 10% bonus.
//! 5. Compare the two totals against the 1.2x thresholds.
//!
//! Everything here is pure: the caller supplies the clock and the battle
//! id, and applies the returned [`BattleResult`] to the world and the
//! agent registry.

use core::fmt::Write as _;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use dominion_types::{
    Agent, AgentId, AgentType, BattleId, BattleOutcome, BattleResult, Player, Territory,
};

use crate::tasks::{DEFEND_TERRITORY, SABOTAGE};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Control change for an overwhelming attack.
pub const FULL_CAPTURE: i32 = 100;

/// Floor added to a narrow attacker win.
const NARROW_WIN_BASE: i32 = 20;

/// Control change for a decisive defence.
const DECISIVE_DEFENCE: i32 = -20;

/// Control change for a narrow defence.
const NARROW_DEFENCE: i32 = -10;

/// Control change for a draw.
const DRAW_SHIFT: i32 = 5;

/// Rosters larger than this suffer diminishing returns.
const UNPENALISED_ROSTER: usize = 3;

/// Defender bonus multiplier (1.1).
fn defence_bonus() -> Decimal {
    Decimal::new(11, 1)
}

/// Decisive-margin multiplier (1.2).
fn decisive_margin() -> Decimal {
    Decimal::new(12, 1)
}

/// Per-agent penalty beyond the third (0.1).
fn crowding_penalty() -> Decimal {
    Decimal::new(1, 1)
}

// ---------------------------------------------------------------------------
// Power
// ---------------------------------------------------------------------------

/// Fixed base power per agent type.
#[allow(clippy::match_same_arms)]
pub fn base_power(agent_type: AgentType) -> Decimal {
    match agent_type {
        AgentType::Scout => Decimal::from(5),
        AgentType::Defense => Decimal::from(10),
        AgentType::Trader => Decimal::from(3),
        AgentType::Resource => Decimal::from(4),
    }
}

/// Task multiplier: 1.5 for a defender on garrison duty, 1.3 for a
/// saboteur scout, 1.0 otherwise.
pub fn task_multiplier(agent_type: AgentType, task: &str) -> Decimal {
    match agent_type {
        AgentType::Defense if task == DEFEND_TERRITORY => Decimal::new(15, 1),
        AgentType::Scout if task == SABOTAGE => Decimal::new(13, 1),
        _ => Decimal::ONE,
    }
}

/// Combat contribution of a single agent.
pub fn agent_power(agent: &Agent) -> Decimal {
    base_power(agent.agent_type).saturating_mul(task_multiplier(agent.agent_type, &agent.task))
}

/// Aggregate strength of one side of a battle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForceStrength {
    /// Agents that actually fought (cooldowns removed), in input order.
    pub agent_ids: Vec<AgentId>,
    /// Total power after diminishing returns and the minimum clamp.
    pub total: Decimal,
}

/// Compute a roster's strength at `now`.
///
/// Agents still cooling down are ignored. The result is never below 1.
pub fn force_strength(agents: &[&Agent], now: DateTime<Utc>) -> ForceStrength {
    let fighting: Vec<&Agent> = agents
        .iter()
        .copied()
        .filter(|a| !a.on_cooldown(now))
        .collect();

    let raw = fighting
        .iter()
        .fold(Decimal::ZERO, |acc, a| acc.saturating_add(agent_power(a)));

    let excess = fighting.len().saturating_sub(UNPENALISED_ROSTER);
    let scaled = if excess > 0 {
        let penalty = crowding_penalty().saturating_mul(Decimal::from(excess));
        raw.saturating_mul(Decimal::ONE.saturating_sub(penalty))
    } else {
        raw
    };

    ForceStrength {
        agent_ids: fighting.iter().map(|a| a.id).collect(),
        total: scaled.max(Decimal::ONE),
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Classify a battle from the attack total and the bonus-adjusted defence.
///
/// Returns the outcome and the control-point change.
pub fn classify(attack: Decimal, defence: Decimal) -> (BattleOutcome, i32) {
    let margin = decisive_margin();
    if attack > defence.saturating_mul(margin) {
        (BattleOutcome::AttackerWon, FULL_CAPTURE)
    } else if attack > defence {
        let share = attack
            .saturating_sub(defence)
            .checked_div(defence)
            .unwrap_or(Decimal::ZERO)
            .saturating_mul(Decimal::from(50))
            .floor()
            .to_i32()
            .unwrap_or(0);
        (BattleOutcome::AttackerWon, share.saturating_add(NARROW_WIN_BASE))
    } else if defence > attack.saturating_mul(margin) {
        (BattleOutcome::DefenderWon, DECISIVE_DEFENCE)
    } else if defence > attack {
        (BattleOutcome::DefenderWon, NARROW_DEFENCE)
    } else {
        (BattleOutcome::Draw, DRAW_SHIFT)
    }
}

// ---------------------------------------------------------------------------
// BattleContext
// ---------------------------------------------------------------------------

/// Everything needed to resolve one attack.
///
/// Assembled by the session from the world, the player ledger and the
/// eligible rosters, then passed into [`resolve_battle`].
#[derive(Debug, Clone)]
pub struct BattleContext<'a> {
    /// The territory under attack.
    pub territory: &'a Territory,
    /// The attacking player.
    pub attacker: &'a Player,
    /// The current owner.
    pub defender: &'a Player,
    /// Attacker's agents at the territory.
    pub attacker_agents: Vec<&'a Agent>,
    /// Defender's agents at the territory.
    pub defender_agents: Vec<&'a Agent>,
    /// Resolution time; used for cooldown filtering and the timestamp.
    pub now: DateTime<Utc>,
}

/// Resolve a battle.
///
/// Deterministic: the same context and id always yield the same result.
pub fn resolve_battle(ctx: &BattleContext<'_>, id: BattleId) -> BattleResult {
    let attack = force_strength(&ctx.attacker_agents, ctx.now);
    let defence = force_strength(&ctx.defender_agents, ctx.now);
    let adjusted_defence = defence.total.saturating_mul(defence_bonus());

    let (outcome, change) = classify(attack.total, adjusted_defence);
    let details = transcript(ctx, &attack, &defence, adjusted_defence, outcome, change);

    BattleResult {
        id,
        territory_id: ctx.territory.id,
        attacker_id: ctx.attacker.id.clone(),
        defender_id: ctx.defender.id.clone(),
        attacker_agent_ids: attack.agent_ids,
        defender_agent_ids: defence.agent_ids,
        outcome,
        territory_control_change: change,
        attacker_power: attack.total,
        defender_power: adjusted_defence,
        timestamp: ctx.now,
        details,
    }
}

// ---------------------------------------------------------------------------
// Transcript
// ---------------------------------------------------------------------------

fn shown(value: Decimal) -> Decimal {
    value.round_dp(2).normalize()
}

fn roster_line(side: &str, player: &Player, agents: &[&Agent], fought: &[AgentId]) -> String {
    let mut line = format!("{side}: {} ({})", player.name, player.faction);
    let listed: Vec<String> = agents
        .iter()
        .filter(|a| fought.contains(&a.id))
        .map(|a| format!("{} [{}] {}", a.name, a.task, shown(agent_power(a))))
        .collect();
    if listed.is_empty() {
        line.push_str(" with no agents");
    } else {
        let _ = write!(line, " with {}", listed.join(", "));
    }
    line
}

fn transcript(
    ctx: &BattleContext<'_>,
    attack: &ForceStrength,
    defence: &ForceStrength,
    adjusted_defence: Decimal,
    outcome: BattleOutcome,
    change: i32,
) -> String {
    let verdict = match outcome {
        BattleOutcome::AttackerWon if change >= FULL_CAPTURE => format!(
            "{} overwhelms the defenders of {}.",
            ctx.attacker.name, ctx.territory.name
        ),
        BattleOutcome::AttackerWon => format!(
            "{} gains {change} control over {}.",
            ctx.attacker.name, ctx.territory.name
        ),
        BattleOutcome::DefenderWon => format!(
            "{} holds {} and recovers {} control.",
            ctx.defender.name,
            ctx.territory.name,
            change.unsigned_abs()
        ),
        BattleOutcome::Draw => format!(
            "Stalemate at {}; control shifts {change} toward {}.",
            ctx.territory.name, ctx.attacker.name
        ),
    };

    [
        format!("Battle for {} (#{})", ctx.territory.name, ctx.territory.id),
        roster_line("Attacker", ctx.attacker, &ctx.attacker_agents, &attack.agent_ids),
        roster_line("Defender", ctx.defender, &ctx.defender_agents, &defence.agent_ids),
        format!(
            "Power: attack {} vs defence {} (base {} + 10%)",
            shown(attack.total),
            shown(adjusted_defence),
            shown(defence.total)
        ),
        format!("Outcome: {verdict}"),
    ]
    .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use dominion_types::{AgentStatus, PlayerId, Resources, TerritoryId, TerritoryType};
    use rust_decimal_macros::dec;

    use super::*;

    fn player(id: &str) -> Player {
        Player {
            id: PlayerId::new(id),
            name: id.to_uppercase(),
            faction: String::from("Test Faction"),
            resources: Resources::ZERO,
        }
    }

    fn agent(id: u32, agent_type: AgentType, task: &str) -> Agent {
        Agent {
            id: AgentId(id),
            name: format!("{}-{id}", agent_type.label()),
            agent_type,
            status: AgentStatus::Active,
            location: TerritoryId(1),
            task: task.to_owned(),
            owner_id: PlayerId::new("p"),
            power: base_power(agent_type),
            cooldown_until: None,
        }
    }

    fn territory() -> Territory {
        Territory::neutral(TerritoryId(1), "Neon Row", TerritoryType::Urban, [])
    }

    #[test]
    fn power_table() {
        assert_eq!(agent_power(&agent(1, AgentType::Scout, "Reconnaissance")), dec!(5));
        assert_eq!(agent_power(&agent(1, AgentType::Scout, SABOTAGE)), dec!(6.5));
        assert_eq!(agent_power(&agent(1, AgentType::Defense, "Patrol")), dec!(10));
        assert_eq!(agent_power(&agent(1, AgentType::Defense, DEFEND_TERRITORY)), dec!(15));
        assert_eq!(agent_power(&agent(1, AgentType::Trader, SABOTAGE)), dec!(3));
        assert_eq!(agent_power(&agent(1, AgentType::Resource, "Survey")), dec!(4));
    }

    #[test]
    fn empty_roster_clamps_to_one() {
        let strength = force_strength(&[], Utc::now());
        assert_eq!(strength.total, Decimal::ONE);
        assert!(strength.agent_ids.is_empty());
    }

    #[test]
    fn diminishing_returns_above_three() {
        let agents: Vec<Agent> = (1..=5).map(|i| agent(i, AgentType::Defense, "Patrol")).collect();
        let refs: Vec<&Agent> = agents.iter().collect();
        // 50 * (1 - 2 * 0.1) = 40
        assert_eq!(force_strength(&refs, Utc::now()).total, dec!(40));
    }

    #[test]
    fn huge_roster_still_clamped() {
        let agents: Vec<Agent> = (1..=14).map(|i| agent(i, AgentType::Scout, "x")).collect();
        let refs: Vec<&Agent> = agents.iter().collect();
        assert_eq!(force_strength(&refs, Utc::now()).total, Decimal::ONE);
    }

    #[test]
    fn cooling_agents_are_excluded() {
        let now = Utc::now();
        let ready = agent(1, AgentType::Defense, "Patrol");
        let mut cooling = agent(2, AgentType::Defense, "Patrol");
        cooling.cooldown_until = Some(now + Duration::minutes(10));
        let mut expired = agent(3, AgentType::Scout, "x");
        expired.cooldown_until = Some(now - Duration::seconds(1));

        let strength = force_strength(&[&ready, &cooling, &expired], now);
        assert_eq!(strength.agent_ids, vec![AgentId(1), AgentId(3)]);
        assert_eq!(strength.total, dec!(15));
    }

    #[test]
    fn classify_thresholds() {
        assert_eq!(classify(dec!(20), dec!(11)), (BattleOutcome::AttackerWon, 100));
        assert_eq!(classify(dec!(10), dec!(9.9)), (BattleOutcome::AttackerWon, 20));
        // (12 - 10) / 10 * 50 = 10, +20
        assert_eq!(classify(dec!(12), dec!(10)), (BattleOutcome::AttackerWon, 30));
        assert_eq!(classify(dec!(5), dec!(11)), (BattleOutcome::DefenderWon, -20));
        assert_eq!(classify(dec!(10), dec!(11)), (BattleOutcome::DefenderWon, -10));
        assert_eq!(classify(dec!(11), dec!(11)), (BattleOutcome::Draw, 5));
    }

    #[test]
    fn full_capture_when_attack_doubles_defence() {
        let attacker = player("attacker");
        let defender = player("defender");
        let t = territory();
        let a1 = agent(1, AgentType::Defense, "Patrol");
        let a2 = agent(2, AgentType::Defense, "Patrol");
        let d1 = agent(3, AgentType::Defense, "Patrol");
        let ctx = BattleContext {
            territory: &t,
            attacker: &attacker,
            defender: &defender,
            attacker_agents: vec![&a1, &a2],
            defender_agents: vec![&d1],
            now: Utc::now(),
        };

        let result = resolve_battle(&ctx, BattleId::new());
        assert_eq!(result.outcome, BattleOutcome::AttackerWon);
        assert_eq!(result.territory_control_change, 100);
        assert_eq!(result.attacker_power, dec!(20));
        assert_eq!(result.defender_power, dec!(11));
        assert_eq!(result.attacker_agent_ids, vec![AgentId(1), AgentId(2)]);
    }

    #[test]
    fn narrow_win_scores_twenty() {
        let attacker = player("attacker");
        let defender = player("defender");
        let t = territory();
        let a1 = agent(1, AgentType::Defense, "Patrol");
        let d1 = agent(2, AgentType::Scout, "Reconnaissance");
        let d2 = agent(3, AgentType::Resource, "Survey");
        let ctx = BattleContext {
            territory: &t,
            attacker: &attacker,
            defender: &defender,
            attacker_agents: vec![&a1],
            defender_agents: vec![&d1, &d2],
            now: Utc::now(),
        };

        let result = resolve_battle(&ctx, BattleId::new());
        assert_eq!(result.outcome, BattleOutcome::AttackerWon);
        assert_eq!(result.defender_power, dec!(9.9));
        assert_eq!(result.territory_control_change, 20);
    }

    #[test]
    fn resolution_is_deterministic() {
        let attacker = player("attacker");
        let defender = player("defender");
        let t = territory();
        let a1 = agent(1, AgentType::Scout, SABOTAGE);
        let d1 = agent(2, AgentType::Defense, DEFEND_TERRITORY);
        let ctx = BattleContext {
            territory: &t,
            attacker: &attacker,
            defender: &defender,
            attacker_agents: vec![&a1],
            defender_agents: vec![&d1],
            now: Utc::now(),
        };
        let id = BattleId::new();

        let first = resolve_battle(&ctx, id);
        let second = resolve_battle(&ctx, id);
        assert_eq!(first, second);
        assert_eq!(first.outcome, BattleOutcome::DefenderWon);
        assert_eq!(first.territory_control_change, -20);
    }

    #[test]
    fn transcript_names_both_sides() {
        let attacker = player("attacker");
        let defender = player("defender");
        let t = territory();
        let a1 = agent(7, AgentType::Scout, "Reconnaissance");
        let ctx = BattleContext {
            territory: &t,
            attacker: &attacker,
            defender: &defender,
            attacker_agents: vec![&a1],
            defender_agents: vec![],
            now: Utc::now(),
        };

        let details = resolve_battle(&ctx, BattleId::new()).details;
        assert!(details.contains("Battle for Neon Row"));
        assert!(details.contains("Attacker: ATTACKER"));
        assert!(details.contains("Scout-7 [Reconnaissance] 5"));
        assert!(details.contains("Defender: DEFENDER (Test Faction) with no agents"));
        assert!(details.contains("Outcome: ATTACKER overwhelms the defenders of Neon Row."));
    }
}
