//! Poll callback that logs a standings line whenever timers fire.

use dominion_core::{GameSession, PollCallback};
use tracing::{debug, info};

/// Logs territory counts and credits per player after any poll that
/// fired at least one effect.
#[derive(Debug, Default)]
pub struct StatusCallback {
    reports: u64,
}

impl StatusCallback {
    /// Create a new status callback.
    pub const fn new() -> Self {
        Self { reports: 0 }
    }

    /// Number of standings lines written so far.
    pub const fn reports(&self) -> u64 {
        self.reports
    }
}

/// One player's position, as logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    /// Player display name.
    pub name: String,
    /// Territories held.
    pub territories: usize,
    /// Live agents, deploying ones included.
    pub agents: usize,
    /// Current credits.
    pub credits: u64,
}

/// Standings for every player, in player id order.
pub fn standings(session: &GameSession) -> Vec<Standing> {
    session
        .all_players()
        .into_iter()
        .map(|player| Standing {
            name: player.name.clone(),
            territories: session.player_territories(&player.id).len(),
            agents: session.player_agents(&player.id).len(),
            credits: player.resources.credits,
        })
        .collect()
}

impl PollCallback for StatusCallback {
    fn on_poll(&mut self, fired: usize, session: &GameSession) {
        if fired == 0 {
            return;
        }
        self.reports = self.reports.saturating_add(1);
        let line = standings(session)
            .iter()
            .map(|s| format!("{} {}T/{}A/{}c", s.name, s.territories, s.agents, s.credits))
            .collect::<Vec<_>>()
            .join(" | ");
        info!(
            fired,
            agents = session.agents().count(),
            pending = session.scheduled_effects(),
            "standings: {line}"
        );
        debug!(next_due = ?session.next_due(), "poll complete");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use dominion_core::GameConfig;
    use dominion_types::{AgentType, PlayerId, TerritoryId};

    use super::*;

    #[test]
    fn standings_track_claims() {
        let mut config = GameConfig::default();
        config.rivals.enabled = false;
        let mut session = GameSession::from_config(&config, Utc::now()).unwrap();
        let commander = PlayerId::new("player-1");
        session.claim_territory(TerritoryId(1), &commander).unwrap();
        session
            .deploy_agent(&commander, AgentType::Scout, TerritoryId(1), "Reconnaissance")
            .unwrap();

        let table = standings(&session);
        let me = table.iter().find(|s| s.name == "Commander").unwrap();
        assert_eq!(me.territories, 1);
        assert_eq!(me.agents, 1);
        assert_eq!(me.credits, 850);
        let vex = table.iter().find(|s| s.name == "Vex Halloran").unwrap();
        assert_eq!(vex.agents, 0);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn quiet_polls_are_not_reported() {
        let session = GameSession::from_config(&GameConfig::default(), Utc::now()).unwrap();
        let mut callback = StatusCallback::new();
        callback.on_poll(0, &session);
        assert_eq!(callback.reports(), 0);
        callback.on_poll(2, &session);
        assert_eq!(callback.reports(), 1);
    }
}
