//! Authoritative territory records.
//!
//! The [`TerritoryLedger`] is the only place territory state changes. It
//! accepts two kinds of mutation: a claim on neutral ground, and the
//! application of a resolved [`BattleResult`].
//!
//! Control points follow the attacker's progress:
//!
//! - attacker won: add the change; at 100 the attacker takes ownership and
//!   the territory stays contested at 100.
//! - defender won: subtract the change, floored at 0; at 0 the territory
//!   is secure again.
//! - draw: add the (positive) change, clamped to 0..=100.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use dominion_types::{
    BattleOutcome, BattleResult, MAX_CONTROL_POINTS, Owner, PlayerId, Territory, TerritoryId,
    TerritoryStatus,
};

use crate::error::WorldError;

/// The set of territories in a session, keyed by id.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TerritoryLedger {
    /// All territories indexed by their identifier.
    territories: BTreeMap<TerritoryId, Territory>,
}

impl TerritoryLedger {
    /// Build a ledger from static map data.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateTerritory`] if two records share an id.
    pub fn new(territories: Vec<Territory>) -> Result<Self, WorldError> {
        let mut ledger = Self::default();
        for territory in territories {
            if ledger.territories.contains_key(&territory.id) {
                return Err(WorldError::DuplicateTerritory(territory.id));
            }
            ledger.territories.insert(territory.id, territory);
        }
        Ok(ledger)
    }

    /// Look up a territory.
    pub fn get(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(&id)
    }

    /// Look up a territory, failing with [`WorldError::TerritoryNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TerritoryNotFound`] for unknown ids.
    pub fn require(&self, id: TerritoryId) -> Result<&Territory, WorldError> {
        self.territories
            .get(&id)
            .ok_or(WorldError::TerritoryNotFound(id))
    }

    /// All territories, ordered by id.
    pub fn territories(&self) -> impl Iterator<Item = &Territory> {
        self.territories.values()
    }

    /// All territory ids, ordered.
    pub fn ids(&self) -> Vec<TerritoryId> {
        self.territories.keys().copied().collect()
    }

    /// Number of territories on the map.
    pub fn len(&self) -> usize {
        self.territories.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.territories.is_empty()
    }

    /// Territories currently held by `player`.
    pub fn owned_by(&self, player: &PlayerId) -> Vec<&Territory> {
        self.territories
            .values()
            .filter(|t| t.owner.is_held_by(player))
            .collect()
    }

    /// Check that a territory exists and is unclaimed, without changing it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TerritoryNotFound`] or
    /// [`WorldError::AlreadyOwned`].
    pub fn ensure_claimable(&self, id: TerritoryId) -> Result<&Territory, WorldError> {
        let territory = self.require(id)?;
        match &territory.owner {
            Owner::Neutral => Ok(territory),
            Owner::Player(owner) => Err(WorldError::AlreadyOwned {
                territory: id,
                owner: owner.clone(),
            }),
        }
    }

    /// Give a neutral territory to `player`.
    ///
    /// The territory becomes secure with zero control points. Charging the
    /// claim cost is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TerritoryNotFound`] or
    /// [`WorldError::AlreadyOwned`].
    pub fn claim(
        &mut self,
        id: TerritoryId,
        player: &PlayerId,
        now: DateTime<Utc>,
    ) -> Result<&Territory, WorldError> {
        self.ensure_claimable(id)?;
        let territory = self
            .territories
            .get_mut(&id)
            .ok_or(WorldError::TerritoryNotFound(id))?;
        territory.owner = Owner::Player(player.clone());
        territory.status = TerritoryStatus::Secure;
        territory.control_points = 0;
        territory.last_capture_time = Some(now);
        info!(territory = %id, player = %player, "territory claimed");
        Ok(territory)
    }

    /// Apply a resolved battle to its territory.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::TerritoryNotFound`] for unknown territories and
    /// [`WorldError::StaleBattle`] if the named defender no longer holds it.
    pub fn apply_battle_result(&mut self, result: &BattleResult) -> Result<&Territory, WorldError> {
        let territory = self
            .territories
            .get_mut(&result.territory_id)
            .ok_or(WorldError::TerritoryNotFound(result.territory_id))?;

        if !territory.owner.is_held_by(&result.defender_id) {
            return Err(WorldError::StaleBattle {
                territory: result.territory_id,
                defender: result.defender_id.clone(),
            });
        }

        let change = result.territory_control_change;
        match result.outcome {
            BattleOutcome::AttackerWon => {
                let raised = shift_control(territory.control_points, change.unsigned_abs(), true);
                territory.status = TerritoryStatus::Contested;
                if raised >= MAX_CONTROL_POINTS {
                    territory.owner = Owner::Player(result.attacker_id.clone());
                    territory.control_points = MAX_CONTROL_POINTS;
                    info!(
                        territory = %territory.id,
                        new_owner = %result.attacker_id,
                        "territory captured"
                    );
                } else {
                    territory.control_points = raised;
                }
            }
            BattleOutcome::DefenderWon => {
                let lowered = shift_control(territory.control_points, change.unsigned_abs(), false);
                territory.control_points = lowered;
                if lowered == 0 {
                    territory.status = TerritoryStatus::Secure;
                }
            }
            BattleOutcome::Draw => {
                territory.control_points =
                    shift_control(territory.control_points, change.unsigned_abs(), change >= 0);
                territory.status = TerritoryStatus::Contested;
            }
        }
        territory.last_capture_time = Some(result.timestamp);

        debug!(
            territory = %territory.id,
            outcome = ?result.outcome,
            control_points = territory.control_points,
            status = ?territory.status,
            "battle applied"
        );
        Ok(territory)
    }
}

/// Move control points up or down by `amount`, clamped to `0..=100`.
fn shift_control(current: u8, amount: u32, up: bool) -> u8 {
    let current = u32::from(current);
    let shifted = if up {
        current.saturating_add(amount)
    } else {
        current.saturating_sub(amount)
    };
    u8::try_from(shifted.min(u32::from(MAX_CONTROL_POINTS))).unwrap_or(MAX_CONTROL_POINTS)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use dominion_types::{BattleId, ResourceKind, TerritoryType};
    use rust_decimal_macros::dec;

    use super::*;

    fn ledger() -> TerritoryLedger {
        TerritoryLedger::new(vec![
            Territory::neutral(TerritoryId(1), "Neon Row", TerritoryType::Urban, [ResourceKind::Credits]),
            Territory::neutral(TerritoryId(2), "Rust Yard", TerritoryType::Industrial, []),
        ])
        .unwrap()
    }

    fn battle(outcome: BattleOutcome, change: i32, attacker: &str, defender: &str) -> BattleResult {
        BattleResult {
            id: BattleId::new(),
            territory_id: TerritoryId(1),
            attacker_id: PlayerId::new(attacker),
            defender_id: PlayerId::new(defender),
            attacker_agent_ids: Vec::new(),
            defender_agent_ids: Vec::new(),
            outcome,
            territory_control_change: change,
            attacker_power: dec!(1),
            defender_power: dec!(1.1),
            timestamp: Utc::now(),
            details: String::new(),
        }
    }

    fn owned_by_bob() -> TerritoryLedger {
        let mut ledger = ledger();
        ledger.claim(TerritoryId(1), &PlayerId::new("bob"), Utc::now()).unwrap();
        ledger
    }

    #[test]
    fn duplicate_ids_rejected() {
        let t = Territory::neutral(TerritoryId(1), "A", TerritoryType::Urban, []);
        assert_eq!(
            TerritoryLedger::new(vec![t.clone(), t]).err(),
            Some(WorldError::DuplicateTerritory(TerritoryId(1)))
        );
    }

    #[test]
    fn claim_neutral_sets_owner_and_secure() {
        let mut ledger = ledger();
        let alice = PlayerId::new("alice");
        let t = ledger.claim(TerritoryId(1), &alice, Utc::now()).unwrap();
        assert_eq!(t.owner, Owner::Player(alice.clone()));
        assert_eq!(t.status, TerritoryStatus::Secure);
        assert!(t.last_capture_time.is_some());
        assert_eq!(ledger.owned_by(&alice).len(), 1);
    }

    #[test]
    fn claim_owned_rejected() {
        let mut ledger = owned_by_bob();
        let err = ledger
            .claim(TerritoryId(1), &PlayerId::new("alice"), Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            WorldError::AlreadyOwned {
                territory: TerritoryId(1),
                owner: PlayerId::new("bob"),
            }
        );
    }

    #[test]
    fn claim_unknown_rejected() {
        let mut ledger = ledger();
        assert_eq!(
            ledger.claim(TerritoryId(99), &PlayerId::new("a"), Utc::now()).err(),
            Some(WorldError::TerritoryNotFound(TerritoryId(99)))
        );
    }

    #[test]
    fn full_capture_flips_owner_but_stays_contested() {
        let mut ledger = owned_by_bob();
        let t = ledger
            .apply_battle_result(&battle(BattleOutcome::AttackerWon, 100, "alice", "bob"))
            .unwrap();
        assert_eq!(t.owner, Owner::Player(PlayerId::new("alice")));
        assert_eq!(t.control_points, 100);
        assert_eq!(t.status, TerritoryStatus::Contested);
    }

    #[test]
    fn partial_win_accumulates_without_flip() {
        let mut ledger = owned_by_bob();
        let t = ledger
            .apply_battle_result(&battle(BattleOutcome::AttackerWon, 40, "alice", "bob"))
            .unwrap();
        assert_eq!(t.control_points, 40);
        assert_eq!(t.status, TerritoryStatus::Contested);
        assert_eq!(t.owner, Owner::Player(PlayerId::new("bob")));

        let t = ledger
            .apply_battle_result(&battle(BattleOutcome::AttackerWon, 70, "alice", "bob"))
            .unwrap();
        assert_eq!(t.control_points, 100);
        assert_eq!(t.owner, Owner::Player(PlayerId::new("alice")));
    }

    #[test]
    fn defense_floors_at_zero_and_secures() {
        let mut ledger = owned_by_bob();
        ledger
            .apply_battle_result(&battle(BattleOutcome::AttackerWon, 15, "alice", "bob"))
            .unwrap();
        let t = ledger
            .apply_battle_result(&battle(BattleOutcome::DefenderWon, -10, "alice", "bob"))
            .unwrap();
        assert_eq!(t.control_points, 5);
        assert_eq!(t.status, TerritoryStatus::Contested);

        let t = ledger
            .apply_battle_result(&battle(BattleOutcome::DefenderWon, -20, "alice", "bob"))
            .unwrap();
        assert_eq!(t.control_points, 0);
        assert_eq!(t.status, TerritoryStatus::Secure);
    }

    #[test]
    fn draw_adds_and_clamps() {
        let mut ledger = owned_by_bob();
        ledger
            .apply_battle_result(&battle(BattleOutcome::AttackerWon, 98, "alice", "bob"))
            .unwrap();
        let t = ledger
            .apply_battle_result(&battle(BattleOutcome::Draw, 5, "alice", "bob"))
            .unwrap();
        assert_eq!(t.control_points, 100);
        assert_eq!(t.owner, Owner::Player(PlayerId::new("bob")));
    }

    #[test]
    fn stale_defender_rejected() {
        let mut ledger = owned_by_bob();
        let err = ledger
            .apply_battle_result(&battle(BattleOutcome::AttackerWon, 100, "alice", "carol"))
            .unwrap_err();
        assert!(matches!(err, WorldError::StaleBattle { .. }));
        assert_eq!(
            ledger.get(TerritoryId(1)).map(|t| t.owner.clone()),
            Some(Owner::Player(PlayerId::new("bob")))
        );
    }

    #[test]
    fn control_points_stay_in_range() {
        for (start, amount, up) in [(0, 500, true), (100, 1, true), (3, 200, false), (0, 0, false)] {
            let shifted = shift_control(start, amount, up);
            assert!(shifted <= MAX_CONTROL_POINTS);
        }
    }

    #[test]
    fn ledger_serializes() {
        let json = serde_json::to_string(&ledger()).unwrap();
        assert!(json.contains("Neon Row"));
    }
}
