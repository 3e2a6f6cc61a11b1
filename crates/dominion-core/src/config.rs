//! Configuration loading and typed config structures for a Dominion session.
//!
//! The configuration lives in `dominion-config.yaml`. Every section and
//! every field has a default, so an empty file (or no file at all) yields a
//! playable session. Durations are milliseconds.

use std::path::Path;

use chrono::TimeDelta;
use serde::Deserialize;

use dominion_types::{Player, PlayerId, Resources};

/// Environment variable overriding `world.seed`.
pub const SEED_ENV: &str = "DOMINION_SEED";

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "DOMINION_LOG_LEVEL";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is unusable.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level session configuration.
///
/// Mirrors the structure of `dominion-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Session identity, seed, and the human player.
    #[serde(default)]
    pub world: WorldConfig,

    /// Delays for scheduled follow-up effects.
    #[serde(default)]
    pub timers: TimerConfig,

    /// Prices and yields.
    #[serde(default)]
    pub economy: EconomyConfig,

    /// Post-battle cooldowns.
    #[serde(default)]
    pub combat: CombatConfig,

    /// Synthetic opponents.
    #[serde(default)]
    pub rivals: RivalsConfig,

    /// Async runner settings.
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl GameConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `DOMINION_SEED` and `DOMINION_LOG_LEVEL` from the process
    /// environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. An unparsable seed is
    /// ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(seed) = lookup(SEED_ENV).and_then(|v| v.trim().parse().ok()) {
            self.world.seed = seed;
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.logging.level = level;
        }
    }

    /// Check values that would stall or break the session.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world.event_log_capacity == 0 {
            return Err(invalid("world.event_log_capacity", "must be at least 1"));
        }
        if self.runner.poll_interval_ms == 0 {
            return Err(invalid("runner.poll_interval_ms", "must be at least 1"));
        }
        if self.rivals.enabled && self.timers.tick_interval_ms == 0 {
            return Err(invalid("timers.tick_interval_ms", "must be at least 1 when rivals are enabled"));
        }
        let mut ids: Vec<&str> = self.rivals.players.iter().map(|p| p.id.as_str()).collect();
        ids.push(self.world.current_player.id.as_str());
        ids.sort_unstable();
        if ids.windows(2).any(|w| w.first() == w.get(1)) {
            return Err(invalid("rivals.players", "player ids must be unique"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_owned(),
    }
}

/// Convert a millisecond setting into a [`TimeDelta`], saturating.
pub fn millis(ms: u64) -> TimeDelta {
    i64::try_from(ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .unwrap_or(TimeDelta::MAX)
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// A player entry in the roster.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlayerSpec {
    /// Stable player id.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Faction label.
    #[serde(default = "default_faction")]
    pub faction: String,

    /// Opening wallet.
    #[serde(default = "default_starting_resources")]
    pub resources: Resources,
}

impl PlayerSpec {
    /// Build the runtime player record.
    pub fn to_player(&self) -> Player {
        Player {
            id: PlayerId::new(self.id.clone()),
            name: self.name.clone(),
            faction: self.faction.clone(),
            resources: self.resources,
        }
    }
}

/// Session identity and the human player.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable session name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Maximum number of game events kept in memory; oldest are dropped.
    #[serde(default = "default_event_log_capacity")]
    pub event_log_capacity: usize,

    /// The player driving the session from outside.
    #[serde(default = "default_current_player")]
    pub current_player: PlayerSpec,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            event_log_capacity: default_event_log_capacity(),
            current_player: default_current_player(),
        }
    }
}

/// Delays for the scheduled halves of actions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimerConfig {
    /// Deploy to active.
    #[serde(default = "default_deployment_ms")]
    pub deployment_ms: u64,

    /// Recall to removal.
    #[serde(default = "default_recall_ms")]
    pub recall_ms: u64,

    /// Claim to rival contest check.
    #[serde(default = "default_rival_contest_ms")]
    pub rival_contest_ms: u64,

    /// Interval between synthetic rival actions.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Lifetime of an unanswered trade offer.
    #[serde(default = "default_trade_expiry_ms")]
    pub trade_expiry_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            deployment_ms: default_deployment_ms(),
            recall_ms: default_recall_ms(),
            rival_contest_ms: default_rival_contest_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            trade_expiry_ms: default_trade_expiry_ms(),
        }
    }
}

/// Prices and yields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EconomyConfig {
    /// Credits charged to claim a neutral territory.
    #[serde(default = "default_claim_cost")]
    pub claim_cost: u64,

    /// Amount credited per resource tag on extraction.
    #[serde(default = "default_extraction_yield")]
    pub extraction_yield: Resources,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            claim_cost: default_claim_cost(),
            extraction_yield: default_extraction_yield(),
        }
    }
}

/// Post-battle cooldowns.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CombatConfig {
    /// Cooldown for the winning side (both sides on a draw).
    #[serde(default = "default_winner_cooldown_ms")]
    pub winner_cooldown_ms: u64,

    /// Cooldown for the losing side.
    #[serde(default = "default_loser_cooldown_ms")]
    pub loser_cooldown_ms: u64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            winner_cooldown_ms: default_winner_cooldown_ms(),
            loser_cooldown_ms: default_loser_cooldown_ms(),
        }
    }
}

/// Synthetic opponents.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RivalsConfig {
    /// Whether the periodic rival tick runs.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Rival roster.
    #[serde(default = "default_rivals")]
    pub players: Vec<PlayerSpec>,
}

impl Default for RivalsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            players: default_rivals(),
        }
    }
}

/// Async runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunnerConfig {
    /// How often the runner advances the session clock.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Stop after this many wall-clock seconds. Unbounded when absent.
    #[serde(default)]
    pub max_runtime_secs: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            max_runtime_secs: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive (e.g. `info,dominion_core=debug`).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "Neon Dominion".to_owned()
}

const fn default_seed() -> u64 {
    42
}

const fn default_event_log_capacity() -> usize {
    500
}

fn default_faction() -> String {
    "Unaligned".to_owned()
}

const fn default_starting_resources() -> Resources {
    Resources::new(1_000, 100, 100, 20)
}

fn default_current_player() -> PlayerSpec {
    PlayerSpec {
        id: "player-1".to_owned(),
        name: "Commander".to_owned(),
        faction: "Neon Syndicate".to_owned(),
        resources: default_starting_resources(),
    }
}

fn default_rivals() -> Vec<PlayerSpec> {
    vec![
        PlayerSpec {
            id: "rival-1".to_owned(),
            name: "Vex Halloran".to_owned(),
            faction: "Chrome Cartel".to_owned(),
            resources: default_starting_resources(),
        },
        PlayerSpec {
            id: "rival-2".to_owned(),
            name: "Iris Kade".to_owned(),
            faction: "Void Runners".to_owned(),
            resources: default_starting_resources(),
        },
    ]
}

const fn default_deployment_ms() -> u64 {
    3_000
}

const fn default_recall_ms() -> u64 {
    3_000
}

const fn default_rival_contest_ms() -> u64 {
    30_000
}

const fn default_tick_interval_ms() -> u64 {
    5_000
}

const fn default_trade_expiry_ms() -> u64 {
    60_000
}

const fn default_claim_cost() -> u64 {
    100
}

const fn default_extraction_yield() -> Resources {
    Resources::new(25, 10, 10, 2)
}

const fn default_winner_cooldown_ms() -> u64 {
    300_000
}

const fn default_loser_cooldown_ms() -> u64 {
    600_000
}

const fn default_poll_interval_ms() -> u64 {
    250
}

const fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_rules() {
        let config = GameConfig::default();
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.economy.claim_cost, 100);
        assert_eq!(config.timers.deployment_ms, 3_000);
        assert_eq!(config.timers.rival_contest_ms, 30_000);
        assert_eq!(config.timers.tick_interval_ms, 5_000);
        assert_eq!(config.combat.winner_cooldown_ms, 300_000);
        assert_eq!(config.combat.loser_cooldown_ms, 600_000);
        assert_eq!(config.rivals.players.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(GameConfig::parse("").unwrap(), GameConfig::default());
    }

    #[test]
    fn shipped_config_file_is_default() {
        let shipped = include_str!("../../../dominion-config.yaml");
        assert_eq!(GameConfig::parse(shipped).unwrap(), GameConfig::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let yaml = r"
world:
  seed: 7
  current_player:
    id: ada
    name: Ada
    resources:
      credits: 50
timers:
  deployment_ms: 10
rivals:
  enabled: false
";
        let config = GameConfig::parse(yaml).unwrap();
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.world.current_player.faction, "Unaligned");
        assert_eq!(config.world.current_player.resources, Resources::credits(50));
        assert_eq!(config.timers.deployment_ms, 10);
        assert_eq!(config.timers.recall_ms, 3_000);
        assert!(!config.rivals.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn overrides_from_lookup() {
        let mut config = GameConfig::default();
        config.apply_overrides(|key| match key {
            SEED_ENV => Some("1234".to_owned()),
            LOG_LEVEL_ENV => Some("debug".to_owned()),
            _ => None,
        });
        assert_eq!(config.world.seed, 1234);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn bad_seed_override_ignored() {
        let mut config = GameConfig::default();
        config.apply_overrides(|key| (key == SEED_ENV).then(|| "abc".to_owned()));
        assert_eq!(config.world.seed, 42);
    }

    #[test]
    fn zero_poll_interval_rejected() {
        let err = GameConfig::parse("runner:\n  poll_interval_ms: 0\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "runner.poll_interval_ms",
                ..
            }
        ));
    }

    #[test]
    fn duplicate_player_ids_rejected() {
        let yaml = r"
rivals:
  players:
    - id: player-1
      name: Clone
";
        assert!(matches!(
            GameConfig::parse(yaml),
            Err(ConfigError::Invalid { field: "rivals.players", .. })
        ));
    }

    #[test]
    fn millis_saturates() {
        assert_eq!(millis(1_500), TimeDelta::milliseconds(1_500));
        assert_eq!(millis(u64::MAX), TimeDelta::MAX);
    }
}
